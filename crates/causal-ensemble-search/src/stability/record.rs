//! Per-variable stability results.

use std::cmp::Ordering;

use causal_ensemble_core::Node;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub variable: Node,
    /// Inclusion probability over successful subsamples.
    pub pi: f64,
    /// Mean minimal effect over successful subsamples (0 where absent).
    pub effect: f64,
    pub pcer: f64,
    pub er: f64,
    /// Ancestor of the target in the supplied ground-truth graph. Always
    /// `false` without one.
    pub true_ancestor: bool,
}

impl Record {
    /// Descending `pi`, then descending effect, then ascending name.
    pub fn ranking_order(a: &Record, b: &Record) -> Ordering {
        b.pi.total_cmp(&a.pi)
            .then_with(|| b.effect.total_cmp(&a.effect))
            .then_with(|| a.variable.cmp(&b.variable))
    }
}

pub fn sort_records(records: &mut [Record]) {
    records.sort_by(Record::ranking_order);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, pi: f64, effect: f64) -> Record {
        Record {
            variable: Node::continuous(name),
            pi,
            effect,
            pcer: 0.0,
            er: 0.0,
            true_ancestor: false,
        }
    }

    #[test]
    fn test_total_order() {
        let mut records = vec![
            record("low", 0.4, 0.9),
            record("tie_small", 0.9, 0.1),
            record("b", 0.9, 0.5),
            record("a", 0.9, 0.5),
        ];
        sort_records(&mut records);
        let names: Vec<_> = records.iter().map(|r| r.variable.name()).collect();
        // Unequal pi always decides; the pi-ties fall back to effect, then name.
        assert_eq!(names, vec!["a", "b", "tie_small", "low"]);
        println!("[PASS] test_total_order");
    }
}
