use crate::error::CoreResult;
use crate::types::{Dataset, EffectRanking, Graph, Node};

/// Minimal-effect estimation (IDA-style): ranks every non-target variable of
/// `data` by its estimated minimal effect on `target` given `pattern`.
pub trait EffectEstimator: Send + Sync {
    fn estimate(&self, data: &Dataset, pattern: &Graph, target: &Node) -> CoreResult<EffectRanking>;
}
