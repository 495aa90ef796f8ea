//! Conditional independence tests and the factory that builds them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Dataset, Node};

/// Test / score families the engine can ask a factory for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// Score-based test from a SEM BIC score.
    #[default]
    SemBic,
    FisherZ,
    ChiSquare,
    /// Score-based test from a conditional Gaussian score (mixed data).
    ConditionalGaussian,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestType::SemBic => "SEM BIC",
            TestType::FisherZ => "Fisher Z",
            TestType::ChiSquare => "Chi Square",
            TestType::ConditionalGaussian => "Conditional Gaussian",
        };
        f.write_str(name)
    }
}

/// Tuning shared by every test family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestSettings {
    /// Penalty discount for score-based tests.
    pub penalty_discount: f64,
    /// Significance level for p-value based tests.
    pub alpha: f64,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            penalty_discount: 2.0,
            alpha: 0.01,
        }
    }
}

/// `x _||_ y | z` decisions over a fixed dataset.
pub trait IndependenceTest: Send + Sync {
    /// Variables the test can answer questions about.
    fn variables(&self) -> &[Node];

    fn is_independent(&self, x: &Node, y: &Node, z: &[Node]) -> CoreResult<bool>;
}

/// Builds tests for a dataset. Unsupported families are rejected when a
/// consumer is constructed, before any parallel work starts.
pub trait IndependenceTestFactory: Send + Sync {
    fn supports(&self, test_type: TestType) -> bool;

    fn build(
        &self,
        test_type: TestType,
        data: &Dataset,
        settings: &TestSettings,
    ) -> CoreResult<Box<dyn IndependenceTest>>;

    /// FAIL FAST helper for consumers.
    ///
    /// # Errors
    ///
    /// `UnsupportedTestConfiguration` if `test_type` is not supported.
    fn ensure_supported(&self, test_type: TestType) -> CoreResult<()> {
        if self.supports(test_type) {
            Ok(())
        } else {
            Err(CoreError::UnsupportedTestConfiguration {
                test: test_type.to_string(),
            })
        }
    }
}
