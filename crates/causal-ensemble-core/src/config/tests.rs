use std::io::Write;

use super::*;
use crate::params::{keys, Parameters};
use crate::traits::TestType;
use crate::types::EdgeEnsemble;

#[test]
fn test_defaults_are_valid() {
    let config = EngineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.stability.num_subsamples, 30);
    assert_eq!(config.stability.max_er, 5.0);
    assert_eq!(config.stability.screening_chunk, 50);
    assert_eq!(config.subsampling.ensemble, EdgeEnsemble::Highest);
    assert_eq!(config.subsampling.number_subsampling, 0);
    assert_eq!(config.stability.parallelism % PARALLELISM_FACTOR, 0);
    println!("[PASS] test_defaults_are_valid");
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
        [stability]
        num_subsamples = 50
        max_er = 2.5
        test_type = "fisher_z"

        [subsampling]
        number_subsampling = 10
        ensemble = "majority"
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.stability.num_subsamples, 50);
    assert_eq!(config.stability.max_er, 2.5);
    assert_eq!(config.stability.test_type, TestType::FisherZ);
    assert_eq!(config.stability.alpha, 0.01);
    assert_eq!(config.subsampling.number_subsampling, 10);
    assert_eq!(config.subsampling.ensemble, EdgeEnsemble::Majority);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_toml_values_rejected() {
    let err = EngineConfig::from_toml_str("[stability]\nnum_subsamples = 0\n").unwrap_err();
    assert!(matches!(err, CoreError::ValidationError { .. }));

    let err = EngineConfig::from_toml_str("[stability]\nsubsample_fraction = 1.5\n").unwrap_err();
    assert!(matches!(err, CoreError::ValidationError { .. }));

    let err = EngineConfig::from_toml_str("[stability\n").unwrap_err();
    assert!(matches!(err, CoreError::ConfigError(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[logging]\nlevel = \"debug\"\nformat = \"compact\"").unwrap();

    let config = EngineConfig::from_file(file.path()).expect("readable config");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Compact);

    let missing = EngineConfig::from_file(Path::new("/definitely/not/here.toml"));
    assert!(matches!(missing, Err(CoreError::ConfigError(_))));
}

#[test]
fn test_subsampling_from_parameters() {
    let params = Parameters::new()
        .with(keys::NUMBER_SUB_SAMPLING, 25)
        .with(keys::SUB_SAMPLE_SIZE, 0)
        .with(keys::SUB_SAMPLING_WITH_REPLACEMENT, true)
        .with(keys::SUB_SAMPLING_ENSEMBLE, 0)
        .with(keys::PARALLELISM, 3)
        .with(keys::SEED, 11);

    let config = SubsamplingConfig::from_parameters(&params).expect("valid parameters");
    assert_eq!(config.number_subsampling, 25);
    assert_eq!(config.subsample_size, None);
    assert!(config.with_replacement);
    assert_eq!(config.ensemble, EdgeEnsemble::Preserved);
    assert_eq!(config.parallelism, 3);
    assert_eq!(config.seed, Some(11));
    assert!(config.is_ensemble());

    let bad = Parameters::new().with(keys::NUMBER_SUB_SAMPLING, -2);
    assert!(SubsamplingConfig::from_parameters(&bad).is_err());
}

#[test]
fn test_stability_from_parameters() {
    let params = Parameters::new()
        .with(keys::NUM_SUBSAMPLES, 12)
        .with(keys::MAX_ER, 1.0)
        .with(keys::PENALTY_DISCOUNT, 4);

    let config = StabilityConfig::from_parameters(&params).expect("valid parameters");
    assert_eq!(config.num_subsamples, 12);
    assert_eq!(config.max_er, 1.0);
    assert_eq!(config.penalty_discount, 4.0);
    assert_eq!(config.seed, None);
    assert_eq!(config.test_settings().alpha, 0.01);
}
