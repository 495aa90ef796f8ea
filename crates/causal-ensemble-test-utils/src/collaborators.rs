//! Reference independence tests, pattern search and effect estimation.
//!
//! These are deliberately simple: dependence is decided by a marginal
//! correlation threshold, so results are easy to predict in tests.

use std::collections::HashMap;

use causal_ensemble_core::{
    CoreError, CoreResult, Dataset, Edge, EffectEstimator, EffectRanking, Graph,
    IndependenceTest, IndependenceTestFactory, Node, PatternSearch, TestSettings, TestType,
};

use crate::stats::pearson;

/// `x` and `y` are dependent iff `|corr(x, y)| >= threshold`. The
/// conditioning set is ignored.
pub struct CorrelationTest {
    variables: Vec<Node>,
    columns: HashMap<String, Vec<f64>>,
    threshold: f64,
}

impl CorrelationTest {
    pub fn new(data: &Dataset, threshold: f64) -> CoreResult<Self> {
        let variables = data.variables().to_vec();
        let columns = variables
            .iter()
            .map(|v| Ok((v.name().to_string(), data.column(v)?)))
            .collect::<CoreResult<HashMap<_, _>>>()?;
        Ok(Self {
            variables,
            columns,
            threshold,
        })
    }

    fn column(&self, node: &Node) -> CoreResult<&[f64]> {
        self.columns
            .get(node.name())
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::NodeNotFound {
                name: node.name().to_string(),
            })
    }
}

impl IndependenceTest for CorrelationTest {
    fn variables(&self) -> &[Node] {
        &self.variables
    }

    fn is_independent(&self, x: &Node, y: &Node, _z: &[Node]) -> CoreResult<bool> {
        let r = pearson(self.column(x)?, self.column(y)?);
        Ok(r.abs() < self.threshold)
    }
}

/// Builds [`CorrelationTest`]s for a configurable set of test types.
pub struct CorrelationTestFactory {
    threshold: f64,
    supported: Vec<TestType>,
}

impl CorrelationTestFactory {
    /// Supports every [`TestType`].
    pub fn new(threshold: f64) -> Self {
        Self::supporting(
            threshold,
            vec![
                TestType::SemBic,
                TestType::FisherZ,
                TestType::ChiSquare,
                TestType::ConditionalGaussian,
            ],
        )
    }

    pub fn supporting(threshold: f64, supported: Vec<TestType>) -> Self {
        Self {
            threshold,
            supported,
        }
    }
}

impl IndependenceTestFactory for CorrelationTestFactory {
    fn supports(&self, test_type: TestType) -> bool {
        self.supported.contains(&test_type)
    }

    fn build(
        &self,
        test_type: TestType,
        data: &Dataset,
        _settings: &TestSettings,
    ) -> CoreResult<Box<dyn IndependenceTest>> {
        self.ensure_supported(test_type)?;
        Ok(Box::new(CorrelationTest::new(data, self.threshold)?))
    }
}

/// Undirected edge between every pair the test calls dependent.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdjacencyPatternSearch;

impl PatternSearch for AdjacencyPatternSearch {
    fn search(&self, test: &dyn IndependenceTest) -> CoreResult<Graph> {
        let variables = test.variables();
        let mut graph = Graph::with_nodes(variables.iter().cloned());
        for (i, x) in variables.iter().enumerate() {
            for y in &variables[i + 1..] {
                if !test.is_independent(x, y, &[])? {
                    graph.add_edge(Edge::undirected(x.clone(), y.clone()))?;
                }
            }
        }
        Ok(graph)
    }
}

/// Effect = `|corr(v, target)|` for variables adjacent to the target in the
/// pattern, 0.0 otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorrelationEffectEstimator;

impl EffectEstimator for CorrelationEffectEstimator {
    fn estimate(&self, data: &Dataset, pattern: &Graph, target: &Node) -> CoreResult<EffectRanking> {
        let y = data.column(target)?;
        let entries = data
            .variables()
            .iter()
            .filter(|v| *v != target)
            .map(|v| {
                let effect = if pattern.is_adjacent(v, target) {
                    pearson(&data.column(v)?, &y).abs()
                } else {
                    0.0
                };
                Ok((v.clone(), effect))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        EffectRanking::new(entries)
    }
}

/// Estimator that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingEstimator;

impl EffectEstimator for FailingEstimator {
    fn estimate(&self, _data: &Dataset, _pattern: &Graph, _target: &Node) -> CoreResult<EffectRanking> {
        Err(CoreError::TaskExecution {
            task: "effect-estimation".into(),
            message: "estimator configured to fail".into(),
        })
    }
}
