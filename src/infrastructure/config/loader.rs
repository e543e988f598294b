use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_watchers: {0}. Must be between 1 and 200")]
    InvalidMaxWatchers(usize),

    #[error("Invalid default_instances: {0}. Must be at least 1")]
    InvalidDefaultInstances(usize),

    #[error("Invalid budget: cpu {cpu}, memory_gb {memory_gb}. Both must be positive")]
    InvalidBudget { cpu: f64, memory_gb: f64 },

    #[error("Invalid poll_interval_ms: {0}. Must be at least 10")]
    InvalidPollInterval(u64),

    #[error("Invalid health_interval_secs: {0}. Must be at least 1")]
    InvalidHealthInterval(u64),

    #[error("Invalid log_tail_lines: {0}. Must be at least 1")]
    InvalidLogTail(u32),

    #[error("Provider base_url cannot be empty")]
    EmptyProviderUrl,

    #[error("Object store base_url cannot be empty")]
    EmptyStoreUrl,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .flotilla/config.yaml (project config)
    /// 3. .flotilla/local.yaml (project local overrides, optional)
    /// 4. Environment variables (FLOTILLA_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".flotilla/config.yaml"))
            .merge(Yaml::file(".flotilla/local.yaml"))
            .merge(Env::prefixed("FLOTILLA_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_watchers == 0 || config.max_watchers > 200 {
            return Err(ConfigError::InvalidMaxWatchers(config.max_watchers));
        }

        if config.default_instances == 0 {
            return Err(ConfigError::InvalidDefaultInstances(config.default_instances));
        }

        if config.budget.cpu <= 0.0 || config.budget.memory_gb <= 0.0 {
            return Err(ConfigError::InvalidBudget {
                cpu: config.budget.cpu,
                memory_gb: config.budget.memory_gb,
            });
        }

        if config.watcher.poll_interval_ms < 10 {
            return Err(ConfigError::InvalidPollInterval(config.watcher.poll_interval_ms));
        }

        if config.watcher.health_interval_secs == 0 {
            return Err(ConfigError::InvalidHealthInterval(
                config.watcher.health_interval_secs,
            ));
        }

        if config.watcher.log_tail_lines == 0 {
            return Err(ConfigError::InvalidLogTail(config.watcher.log_tail_lines));
        }

        if config.provider.base_url.is_empty() {
            return Err(ConfigError::EmptyProviderUrl);
        }

        if config.object_store.base_url.is_empty() {
            return Err(ConfigError::EmptyStoreUrl);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.max_watchers, 30);
        assert_eq!(config.watcher.health_interval_secs, 10);
        assert_eq!(config.watcher.poll_interval_ms, 1000);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "max_watchers: 12\nwatcher:\n  poll_interval_ms: 250\nprovider:\n  region: westeurope"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.max_watchers, 12);
        assert_eq!(config.watcher.poll_interval_ms, 250);
        assert_eq!(config.provider.region, "westeurope");
        // Untouched sections keep their defaults.
        assert_eq!(config.watcher.health_interval_secs, 10);
    }

    #[test]
    fn zero_watchers_is_rejected() {
        let config = Config { max_watchers: 0, ..Config::default() };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxWatchers(0))
        ));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let config = Config {
            budget: crate::domain::models::ResourceBudget::new(-1.0, 16.0),
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let config = Config {
            logging: crate::domain::models::LoggingConfig {
                level: "verbose".to_string(),
                ..Default::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
