//! Configuration management for the ensemble engine.

mod sub_configs;

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use sub_configs::{
    default_parallelism, LogFormat, LoggingConfig, StabilityConfig, SubsamplingConfig,
    PARALLELISM_FACTOR,
};

/// Environment variable selecting the environment-specific config file.
pub const ENV_SELECTOR: &str = "CAUSAL_ENSEMBLE_ENV";

/// Prefix of configuration overrides read from the environment.
pub const ENV_PREFIX: &str = "CAUSAL_ENSEMBLE";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub subsampling: SubsamplingConfig,
    pub stability: StabilityConfig,
}

impl EngineConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{CAUSAL_ENSEMBLE_ENV}.toml (environment-specific)
    /// 3. Environment variables with CAUSAL_ENSEMBLE__ prefix
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.logging.level.trim().is_empty() {
            return Err(CoreError::ConfigError("logging.level must not be empty".into()));
        }
        self.subsampling.validate()?;
        self.stability.validate()?;
        Ok(())
    }
}
