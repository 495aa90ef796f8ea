//! Edge-ensemble policy selector.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rule for merging many candidate graphs into one consensus graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEnsemble {
    /// Keep an edge only if every input graph has exactly that edge.
    Preserved,
    /// Keep the most frequent edge variant for each pair.
    #[default]
    Highest,
    /// Keep the most frequent variant only if it occurs in more than half of
    /// the input graphs.
    Majority,
}

impl EdgeEnsemble {
    /// Integer codes used by named-parameter sets: 0 = Preserved,
    /// 1 = Highest, 2 = Majority. Any other code selects Highest.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => EdgeEnsemble::Preserved,
            2 => EdgeEnsemble::Majority,
            _ => EdgeEnsemble::Highest,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            EdgeEnsemble::Preserved => 0,
            EdgeEnsemble::Highest => 1,
            EdgeEnsemble::Majority => 2,
        }
    }
}

impl fmt::Display for EdgeEnsemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeEnsemble::Preserved => "preserved",
            EdgeEnsemble::Highest => "highest",
            EdgeEnsemble::Majority => "majority",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(EdgeEnsemble::from_code(0), EdgeEnsemble::Preserved);
        assert_eq!(EdgeEnsemble::from_code(1), EdgeEnsemble::Highest);
        assert_eq!(EdgeEnsemble::from_code(2), EdgeEnsemble::Majority);
        assert_eq!(EdgeEnsemble::from_code(7), EdgeEnsemble::Highest);
        assert_eq!(EdgeEnsemble::from_code(-1), EdgeEnsemble::Highest);
        for policy in [EdgeEnsemble::Preserved, EdgeEnsemble::Highest, EdgeEnsemble::Majority] {
            assert_eq!(EdgeEnsemble::from_code(policy.code()), policy);
        }
    }
}
