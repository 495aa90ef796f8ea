//! Sub-configuration types for the ensemble engine.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::params::{keys, Parameters};
use crate::traits::{TestSettings, TestType};
use crate::types::EdgeEnsemble;

/// Worker multiplier applied to the hardware concurrency.
pub const PARALLELISM_FACTOR: usize = 4;

/// Default worker count: available hardware concurrency × [`PARALLELISM_FACTOR`].
/// Falls back to one core when the platform cannot report it.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * PARALLELISM_FACTOR
}

fn to_usize(name: &str, value: i64) -> CoreResult<usize> {
    usize::try_from(value)
        .map_err(|_| CoreError::validation(name, format!("must be >= 0, got {}", value)))
}

// ============================================================================
// LOGGING
// ============================================================================

/// Output style of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `causal_ensemble_search=debug`.
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        }
    }
}

// ============================================================================
// SUBSAMPLING HARNESS
// ============================================================================

/// Settings of the generic bootstrap / subsampling search harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsamplingConfig {
    /// Number of resampled searches. 0 disables ensembling: the algorithm
    /// runs once, directly, on the source data.
    pub number_subsampling: usize,
    /// Rows per resample. `None` = half the rows without replacement, all
    /// rows with replacement.
    pub subsample_size: Option<usize>,
    pub with_replacement: bool,
    pub ensemble: EdgeEnsemble,
    /// Maximum concurrently running tasks.
    pub parallelism: usize,
    /// Base seed; task `i` uses `seed + i`. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SubsamplingConfig {
    fn default() -> Self {
        Self {
            number_subsampling: 0,
            subsample_size: None,
            with_replacement: false,
            ensemble: EdgeEnsemble::Highest,
            parallelism: default_parallelism(),
            seed: None,
        }
    }
}

impl SubsamplingConfig {
    /// Reads `numberSubSampling`, `subSampleSize` (<= 0 means default),
    /// `subSamplingWithReplacement`, `subSamplingEnsemble`, `parallelism`
    /// and `seed`, falling back to the defaults.
    pub fn from_parameters(params: &Parameters) -> CoreResult<Self> {
        let defaults = Self::default();
        let size = params.get_int(keys::SUB_SAMPLE_SIZE, 0)?;
        let seed = if params.contains(keys::SEED) {
            Some(params.get_int(keys::SEED, 0)? as u64)
        } else {
            None
        };

        let config = Self {
            number_subsampling: to_usize(
                keys::NUMBER_SUB_SAMPLING,
                params.get_int(keys::NUMBER_SUB_SAMPLING, 0)?,
            )?,
            subsample_size: (size > 0).then_some(size as usize),
            with_replacement: params.get_bool(keys::SUB_SAMPLING_WITH_REPLACEMENT, false)?,
            ensemble: EdgeEnsemble::from_code(params.get_int(keys::SUB_SAMPLING_ENSEMBLE, 1)?),
            parallelism: to_usize(
                keys::PARALLELISM,
                params.get_int(keys::PARALLELISM, defaults.parallelism as i64)?,
            )?,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.parallelism == 0 {
            return Err(CoreError::validation("parallelism", "must be greater than 0"));
        }
        if self.subsample_size == Some(0) {
            return Err(CoreError::validation("subsample_size", "must be greater than 0"));
        }
        Ok(())
    }

    /// Whether resampled searches are run at all.
    pub fn is_ensemble(&self) -> bool {
        self.number_subsampling > 0
    }
}

// ============================================================================
// STABILITY SELECTION
// ============================================================================

/// Settings of the CStaS stability selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub num_subsamples: usize,
    /// Fraction of the screened rows drawn (without replacement) per subsample.
    pub subsample_fraction: f64,
    pub penalty_discount: f64,
    pub alpha: f64,
    /// Largest acceptable expected number of false inclusions.
    pub max_er: f64,
    pub parallelism: usize,
    /// Test used by the per-subsample pattern search.
    pub test_type: TestType,
    /// Test used by variable screening.
    pub screening_test: TestType,
    /// Variables per screening task.
    pub screening_chunk: usize,
    pub seed: Option<u64>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            num_subsamples: 30,
            subsample_fraction: 0.5,
            penalty_discount: 2.0,
            alpha: 0.01,
            max_er: 5.0,
            parallelism: default_parallelism(),
            test_type: TestType::SemBic,
            screening_test: TestType::SemBic,
            screening_chunk: 50,
            seed: None,
        }
    }
}

impl StabilityConfig {
    /// Reads `numSubsamples`, `penaltyDiscount`, `alpha`, `maxEr`,
    /// `parallelism` and `seed` over the defaults.
    pub fn from_parameters(params: &Parameters) -> CoreResult<Self> {
        let defaults = Self::default();
        let seed = if params.contains(keys::SEED) {
            Some(params.get_int(keys::SEED, 0)? as u64)
        } else {
            None
        };

        let config = Self {
            num_subsamples: to_usize(
                keys::NUM_SUBSAMPLES,
                params.get_int(keys::NUM_SUBSAMPLES, defaults.num_subsamples as i64)?,
            )?,
            penalty_discount: params.get_real(keys::PENALTY_DISCOUNT, defaults.penalty_discount)?,
            alpha: params.get_real(keys::ALPHA, defaults.alpha)?,
            max_er: params.get_real(keys::MAX_ER, defaults.max_er)?,
            parallelism: to_usize(
                keys::PARALLELISM,
                params.get_int(keys::PARALLELISM, defaults.parallelism as i64)?,
            )?,
            seed,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.num_subsamples == 0 {
            return Err(CoreError::validation("num_subsamples", "must be greater than 0"));
        }
        if !(self.subsample_fraction > 0.0 && self.subsample_fraction <= 1.0) {
            return Err(CoreError::validation(
                "subsample_fraction",
                format!("must be in (0, 1], got {}", self.subsample_fraction),
            ));
        }
        if !(self.max_er.is_finite() && self.max_er >= 0.0) {
            return Err(CoreError::validation(
                "max_er",
                format!("must be finite and >= 0, got {}", self.max_er),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(CoreError::validation(
                "alpha",
                format!("must be in (0, 1), got {}", self.alpha),
            ));
        }
        if !(self.penalty_discount > 0.0) {
            return Err(CoreError::validation("penalty_discount", "must be greater than 0"));
        }
        if self.parallelism == 0 {
            return Err(CoreError::validation("parallelism", "must be greater than 0"));
        }
        if self.screening_chunk == 0 {
            return Err(CoreError::validation("screening_chunk", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn test_settings(&self) -> TestSettings {
        TestSettings {
            penalty_discount: self.penalty_discount,
            alpha: self.alpha,
        }
    }
}
