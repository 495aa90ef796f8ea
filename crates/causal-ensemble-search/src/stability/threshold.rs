//! Inclusion probabilities and the neighbourhood-size (q) search.

use std::collections::BTreeMap;

use causal_ensemble_core::{EffectRanking, Node};
use tracing::debug;

use super::bounds::er;

/// Outcome of the q search.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Neighbourhood size that produced the largest retained set.
    pub q: usize,
    /// Inclusion probability of every candidate at `q`, in candidate order.
    pub pis: Vec<(Node, f64)>,
    /// Candidates with `er <= max_er` at `q`.
    pub retained: Vec<Node>,
}

/// `pi` of every candidate: the share of rankings that place it within
/// the first `q` positions with a positive effect. Nodes outside
/// `candidates` are ignored. `rankings` must not be empty.
pub fn inclusion_probabilities(rankings: &[EffectRanking], candidates: &[Node], q: usize) -> Vec<(Node, f64)> {
    let mut counts: BTreeMap<&Node, usize> = candidates.iter().map(|c| (c, 0)).collect();
    for ranking in rankings {
        for (node, effect) in ranking.top(q) {
            if *effect > 0.0 {
                if let Some(count) = counts.get_mut(node) {
                    *count += 1;
                }
            }
        }
    }

    let total = rankings.len() as f64;
    candidates
        .iter()
        .map(|c| (c.clone(), counts.get(c).copied().unwrap_or(0) as f64 / total))
        .collect()
}

/// Grows q from 1 to `candidates.len()` and stops at the first q whose
/// retained set is strictly smaller than the largest seen so far. Equal
/// sizes keep growing, and the later q wins.
///
/// Returns `None` when there are no candidates or no rankings.
pub fn search_threshold(rankings: &[EffectRanking], candidates: &[Node], max_er: f64) -> Option<Selection> {
    if candidates.is_empty() || rankings.is_empty() {
        return None;
    }

    let p = candidates.len() as f64;
    let mut best: Option<Selection> = None;
    let mut max_out = 0;

    for q in 1..=candidates.len() {
        let pis = inclusion_probabilities(rankings, candidates, q);
        let retained: Vec<Node> = pis
            .iter()
            .filter(|(_, pi)| er(*pi, q as f64, p) <= max_er)
            .map(|(node, _)| node.clone())
            .collect();

        debug!(q, retained = retained.len(), max_out, "Threshold step");

        if retained.len() < max_out {
            break;
        }
        max_out = retained.len();
        best = Some(Selection { q, pis, retained });
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str) -> Node {
        Node::continuous(name)
    }

    fn ranking(entries: &[(&str, f64)]) -> EffectRanking {
        EffectRanking::new(entries.iter().map(|(name, e)| (n(name), *e)).collect()).unwrap()
    }

    #[test]
    fn test_inclusion_requires_positive_effect_in_top_q() {
        let rankings = vec![
            ranking(&[("a", 0.9), ("b", 0.5), ("c", 0.0)]),
            ranking(&[("b", 0.8), ("a", 0.4), ("c", 0.0)]),
        ];
        let candidates = vec![n("a"), n("b"), n("c")];

        let at1 = inclusion_probabilities(&rankings, &candidates, 1);
        assert_eq!(at1, vec![(n("a"), 0.5), (n("b"), 0.5), (n("c"), 0.0)]);

        let at3 = inclusion_probabilities(&rankings, &candidates, 3);
        assert_eq!(at3, vec![(n("a"), 1.0), (n("b"), 1.0), (n("c"), 0.0)]);
    }

    #[test]
    fn test_negative_effect_occupies_top_q_slot() {
        // "neg" has the largest magnitude, so it takes position 0 without
        // counting toward its own pi and pushes "b" out of the top two.
        let rankings = vec![
            ranking(&[("a", 0.5), ("neg", -0.9), ("b", 0.1)]),
            ranking(&[("b", 0.1), ("a", 0.5), ("neg", -0.9)]),
        ];
        let candidates = vec![n("a"), n("b"), n("neg")];

        let at1 = inclusion_probabilities(&rankings, &candidates, 1);
        assert_eq!(at1, vec![(n("a"), 0.0), (n("b"), 0.0), (n("neg"), 0.0)]);

        let at2 = inclusion_probabilities(&rankings, &candidates, 2);
        assert_eq!(at2, vec![(n("a"), 1.0), (n("b"), 0.0), (n("neg"), 0.0)]);

        let at3 = inclusion_probabilities(&rankings, &candidates, 3);
        assert_eq!(at3, vec![(n("a"), 1.0), (n("b"), 1.0), (n("neg"), 0.0)]);
        println!("[PASS] test_negative_effect_occupies_top_q_slot");
    }

    #[test]
    fn test_non_candidates_are_ignored() {
        let rankings = vec![ranking(&[("target", 5.0), ("a", 1.0)])];
        let pis = inclusion_probabilities(&rankings, &[n("a")], 1);
        assert_eq!(pis, vec![(n("a"), 0.0)]);
    }

    #[test]
    fn test_search_grows_until_selection_shrinks() {
        // Ten rankings over four candidates. "a" and "b" always lead.
        let rankings: Vec<_> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ranking(&[("a", 0.9), ("b", 0.8), ("c", 0.1), ("d", 0.05)])
                } else {
                    ranking(&[("b", 0.9), ("a", 0.8), ("d", 0.1), ("c", 0.05)])
                }
            })
            .collect();
        let candidates = vec![n("a"), n("b"), n("c"), n("d")];

        let selection = search_threshold(&rankings, &candidates, 5.0).unwrap();
        // q=1: pi 0.5 each, nothing passes. q=2: a, b at pi 1 pass
        // (er = 0.25). q=3: a, b pass (er = 0.5625), c, d at pi 0.5 fail.
        // q=4: every pi is 1, er = 1.0 for all four.
        assert_eq!(selection.q, 4);
        assert_eq!(selection.retained.len(), 4);
        println!("[PASS] test_search_grows_until_selection_shrinks");
    }

    #[test]
    fn test_search_stops_on_decrease() {
        // q=1 retains "a" with er = 0.125. At q=2 er(a) rises to 0.5,
        // above max_er, and "b" (pi 0.5) fails too.
        let rankings: Vec<_> = (0..4)
            .map(|i| {
                if i % 2 == 0 {
                    ranking(&[("a", 0.9), ("b", 0.5)])
                } else {
                    ranking(&[("a", 0.9), ("b", 0.0)])
                }
            })
            .collect();
        let candidates = vec![n("a"), n("b")];

        let selection = search_threshold(&rankings, &candidates, 0.2).unwrap();
        assert_eq!(selection.q, 1);
        assert_eq!(selection.retained, vec![n("a")]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(search_threshold(&[], &[n("a")], 5.0).is_none());
        assert!(search_threshold(&[ranking(&[("a", 1.0)])], &[], 5.0).is_none());
    }
}
