//! Named-option parameter sets handed to search algorithms.
//!
//! Algorithms read the options they understand by name; unknown names are
//! ignored. The keys consumed by the ensemble engine are listed in [`keys`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Well-known parameter names.
pub mod keys {
    pub const NUMBER_SUB_SAMPLING: &str = "numberSubSampling";
    pub const SUB_SAMPLE_SIZE: &str = "subSampleSize";
    pub const SUB_SAMPLING_WITH_REPLACEMENT: &str = "subSamplingWithReplacement";
    pub const SUB_SAMPLING_ENSEMBLE: &str = "subSamplingEnsemble";
    pub const NUM_SUBSAMPLES: &str = "numSubsamples";
    pub const MAX_ER: &str = "maxEr";
    pub const PENALTY_DISCOUNT: &str = "penaltyDiscount";
    pub const ALPHA: &str = "alpha";
    pub const PARALLELISM: &str = "parallelism";
    pub const SEED: &str = "seed";
    pub const VERBOSE: &str = "verbose";
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Named options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an option.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Integer option. Reals with no fractional part are accepted.
    ///
    /// # Errors
    ///
    /// `ValidationError` if the option exists with a non-integer value.
    pub fn get_int(&self, name: &str, default: i64) -> CoreResult<i64> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(ParamValue::Real(v)) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
            Some(other) => Err(Self::type_error(name, "integer", other)),
        }
    }

    /// Real option. Integers are widened.
    pub fn get_real(&self, name: &str, default: f64) -> CoreResult<f64> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Real(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(other) => Err(Self::type_error(name, "real", other)),
        }
    }

    pub fn get_bool(&self, name: &str, default: bool) -> CoreResult<bool> {
        match self.values.get(name) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(Self::type_error(name, "boolean", other)),
        }
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    fn type_error(name: &str, expected: &str, found: &ParamValue) -> CoreError {
        CoreError::validation(name, format!("expected {} value, found {:?}", expected, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters_and_defaults() {
        let params = Parameters::new()
            .with(keys::NUMBER_SUB_SAMPLING, 20)
            .with(keys::ALPHA, 0.05)
            .with(keys::SUB_SAMPLING_WITH_REPLACEMENT, true)
            .with(keys::MAX_ER, 3);

        assert_eq!(params.get_int(keys::NUMBER_SUB_SAMPLING, 0).unwrap(), 20);
        assert_eq!(params.get_real(keys::ALPHA, 0.01).unwrap(), 0.05);
        assert_eq!(params.get_real(keys::MAX_ER, 5.0).unwrap(), 3.0);
        assert!(params.get_bool(keys::SUB_SAMPLING_WITH_REPLACEMENT, false).unwrap());
        assert_eq!(params.get_int(keys::SUB_SAMPLING_ENSEMBLE, 1).unwrap(), 1);
    }

    #[test]
    fn test_type_mismatch_fails() {
        let params = Parameters::new().with(keys::PARALLELISM, "many");
        assert!(params.get_int(keys::PARALLELISM, 4).is_err());
        assert_eq!(params.get_text(keys::PARALLELISM), Some("many"));

        let params = Parameters::new().with(keys::SUB_SAMPLE_SIZE, 2.5);
        assert!(params.get_int(keys::SUB_SAMPLE_SIZE, 0).is_err());
    }

    #[test]
    fn test_json_round_trip_is_flat() {
        let params = Parameters::new().with(keys::SEED, 7).with(keys::VERBOSE, false);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"seed":7,"verbose":false}"#);
        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
