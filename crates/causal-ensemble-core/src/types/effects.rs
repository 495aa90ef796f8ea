//! Per-run effect rankings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

use super::node::Node;

/// Estimated (minimal) effects of variables on a target for ONE search run,
/// sorted by descending magnitude. Signs are kept. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRanking {
    entries: Vec<(Node, f64)>,
}

impl EffectRanking {
    /// Sorts `entries` by descending `|effect|` (ties by ascending name).
    ///
    /// # Errors
    ///
    /// `ValidationError` if an effect is NaN or a variable appears twice.
    pub fn new(mut entries: Vec<(Node, f64)>) -> CoreResult<Self> {
        if let Some((node, _)) = entries.iter().find(|(_, e)| e.is_nan()) {
            return Err(CoreError::validation(
                "effects",
                format!("effect for '{}' is NaN", node.name()),
            ));
        }

        {
            let mut seen = HashSet::with_capacity(entries.len());
            if let Some((node, _)) = entries.iter().find(|(n, _)| !seen.insert(n.name())) {
                return Err(CoreError::validation(
                    "effects",
                    format!("variable '{}' ranked twice", node.name()),
                ));
            }
        }

        entries.sort_by(|(na, ea), (nb, eb)| {
            eb.abs().total_cmp(&ea.abs()).then_with(|| na.cmp(nb))
        });

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Node, f64)] {
        &self.entries
    }

    /// The first `q` ranked entries (fewer if the ranking is shorter).
    pub fn top(&self, q: usize) -> &[(Node, f64)] {
        &self.entries[..q.min(self.entries.len())]
    }

    pub fn effect_of(&self, node: &Node) -> Option<f64> {
        self.entries.iter().find(|(n, _)| n == node).map(|(_, e)| *e)
    }
}
