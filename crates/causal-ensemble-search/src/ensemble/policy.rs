//! Edge variants and the per-pair decision rule of each ensemble policy.

use std::collections::BTreeMap;
use std::fmt;

use causal_ensemble_core::{Edge, EdgeEnsemble, Endpoint, Node};

/// The endpoint pair of an edge between a fixed, normalized node pair
/// (`first < second` by name). `at_first` is the mark at `first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeVariant {
    pub at_first: Endpoint,
    pub at_second: Endpoint,
}

/// Tie-break order, most preferred first. Fully directed edges win over
/// bidirected ones, which win over partially oriented, undirected and
/// nondirected ones. Between the two directions of the same kind, the one
/// pointing at the later node name wins.
pub const PREFERENCE: [EdgeVariant; 9] = [
    EdgeVariant::new(Endpoint::Tail, Endpoint::Arrow),
    EdgeVariant::new(Endpoint::Arrow, Endpoint::Tail),
    EdgeVariant::new(Endpoint::Arrow, Endpoint::Arrow),
    EdgeVariant::new(Endpoint::Circle, Endpoint::Arrow),
    EdgeVariant::new(Endpoint::Arrow, Endpoint::Circle),
    EdgeVariant::new(Endpoint::Tail, Endpoint::Tail),
    EdgeVariant::new(Endpoint::Circle, Endpoint::Circle),
    EdgeVariant::new(Endpoint::Tail, Endpoint::Circle),
    EdgeVariant::new(Endpoint::Circle, Endpoint::Tail),
];

impl EdgeVariant {
    pub const fn new(at_first: Endpoint, at_second: Endpoint) -> Self {
        Self {
            at_first,
            at_second,
        }
    }

    /// Variant of an (already normalized) edge.
    pub fn of(edge: &Edge) -> Self {
        Self::new(edge.endpoint1(), edge.endpoint2())
    }

    /// Position in [`PREFERENCE`]; lower is preferred.
    pub fn rank(self) -> usize {
        PREFERENCE
            .iter()
            .position(|v| *v == self)
            .unwrap_or(PREFERENCE.len())
    }

    pub fn to_edge(self, first: Node, second: Node) -> Edge {
        Edge::new(first, second, self.at_first, self.at_second)
    }
}

impl fmt::Display for EdgeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = match self.at_first {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match self.at_second {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        write!(f, "{}-{}", left, right)
    }
}

/// Variant with the highest count; ties go to the lower [`EdgeVariant::rank`].
pub fn most_frequent(counts: &BTreeMap<EdgeVariant, usize>) -> Option<(EdgeVariant, usize)> {
    counts
        .iter()
        .map(|(variant, count)| (*variant, *count))
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.rank().cmp(&va.rank())))
}

/// The variant `policy` keeps for one node pair, given how often each
/// variant was seen across `total` graphs.
pub fn decide(
    policy: EdgeEnsemble,
    counts: &BTreeMap<EdgeVariant, usize>,
    total: usize,
) -> Option<EdgeVariant> {
    let (winner, count) = most_frequent(counts)?;
    let keep = match policy {
        EdgeEnsemble::Preserved => count == total,
        EdgeEnsemble::Highest => count > 0,
        EdgeEnsemble::Majority => 2 * count > total,
    };
    keep.then_some(winner)
}
