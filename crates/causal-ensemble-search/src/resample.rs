//! Row resampling: bootstrap (with replacement) and subsampling (without).
//!
//! The source [`Dataset`] is never touched; every draw builds a new one.
//! A [`Resampler`] holds no state, so one instance can serve every worker.

use causal_ensemble_core::{CoreError, CoreResult, Dataset};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    with_replacement: bool,
}

impl Resampler {
    pub fn new(with_replacement: bool) -> Self {
        Self { with_replacement }
    }

    /// Draws with replacement.
    pub fn bootstrap() -> Self {
        Self::new(true)
    }

    /// Draws without replacement.
    pub fn subsample() -> Self {
        Self::new(false)
    }

    pub fn with_replacement(&self) -> bool {
        self.with_replacement
    }

    /// FAIL FAST size check, usable before any work is scheduled.
    ///
    /// # Errors
    ///
    /// `InvalidSampleSize` if `size == 0`, or if `size > available` without
    /// replacement, or if there is nothing to draw from.
    pub fn check_size(&self, size: usize, available: usize) -> CoreResult<()> {
        let too_large = !self.with_replacement && size > available;
        if size == 0 || available == 0 || too_large {
            return Err(CoreError::InvalidSampleSize {
                requested: size,
                available,
                with_replacement: self.with_replacement,
            });
        }
        Ok(())
    }

    /// Row indices for one draw. Without replacement the indices are
    /// distinct and sorted ascending.
    pub fn draw_indices<R: Rng + ?Sized>(
        &self,
        available: usize,
        size: usize,
        rng: &mut R,
    ) -> CoreResult<Vec<usize>> {
        self.check_size(size, available)?;

        if self.with_replacement {
            return Ok((0..size).map(|_| rng.gen_range(0..available)).collect());
        }

        let mut indices = rand::seq::index::sample(rng, available, size).into_vec();
        indices.sort_unstable();
        Ok(indices)
    }

    /// `size` rows of `data` as a new dataset.
    pub fn sample<R: Rng + ?Sized>(&self, data: &Dataset, size: usize, rng: &mut R) -> CoreResult<Dataset> {
        let indices = self.draw_indices(data.num_rows(), size, rng)?;
        data.select_rows(&indices)
    }
}

/// Default draw size: half the rows without replacement, all rows with
/// replacement. Never below 1.
pub fn default_subsample_size(rows: usize, with_replacement: bool) -> usize {
    let size = if with_replacement { rows } else { rows / 2 };
    size.max(1)
}

/// Splits `total` draws across sources in proportion to their row counts.
///
/// Floors first, then hands the remainder out one row at a time in source
/// order, skipping sources that are already full when drawing without
/// replacement. The caller has checked `total` against the combined rows.
pub fn proportional_sizes(rows: &[usize], total: usize, with_replacement: bool) -> Vec<usize> {
    let available: usize = rows.iter().sum();
    if available == 0 {
        return vec![0; rows.len()];
    }

    let mut sizes: Vec<usize> = rows.iter().map(|&r| total * r / available).collect();
    let mut remaining = total - sizes.iter().sum::<usize>();
    while remaining > 0 {
        let mut progressed = false;
        for (size, &r) in sizes.iter_mut().zip(rows) {
            if remaining == 0 {
                break;
            }
            if r > 0 && (with_replacement || *size < r) {
                *size += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    sizes
}

/// RNG for task `index`: seeded from `seed + index` when a base seed is
/// given, from OS entropy otherwise.
pub fn task_rng(seed: Option<u64>, index: usize) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => ChaCha8Rng::from_entropy(),
    }
}
