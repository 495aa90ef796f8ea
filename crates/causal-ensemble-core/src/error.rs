//! Error types for causal-ensemble-core.
//!
//! Every fallible operation in the workspace returns [`CoreResult`]. Numeric
//! range failures of the stability bounds are NOT errors; they are encoded as
//! `f64::INFINITY` by the bound functions themselves.

use thiserror::Error;

/// Top-level error type shared by the core and search crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested resample size cannot be drawn from the source.
    #[error(
        "Invalid sample size: requested {requested} rows from {available} (with_replacement = {with_replacement})"
    )]
    InvalidSampleSize {
        requested: usize,
        available: usize,
        with_replacement: bool,
    },

    /// No independence test / score is configured for the requested type.
    #[error("Unsupported test configuration: {test}")]
    UnsupportedTestConfiguration { test: String },

    /// A single search or estimation task failed.
    #[error("Task {task} failed: {message}")]
    TaskExecution { task: String, message: String },

    /// Every task in a batch failed (or none were submitted), so there is
    /// nothing to aggregate.
    #[error("Empty ensemble: {failed} of {submitted} tasks failed, no results to aggregate")]
    EmptyEnsemble { submitted: usize, failed: usize },

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    #[error("Invalid edge {from} - {to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Incompatible datasets: {0}")]
    IncompatibleDatasets(String),

    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Batch cancelled before any task completed")]
    Cancelled,
}

impl CoreError {
    /// Shorthand for a [`CoreError::ValidationError`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
