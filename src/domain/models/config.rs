use serde::{Deserialize, Serialize};

use crate::domain::models::fleet::ResourceBudget;

/// Main configuration structure for Flotilla
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Maximum number of concurrent completion watchers (1-200)
    #[serde(default = "default_max_watchers")]
    pub max_watchers: usize,

    /// Default number of instances when a request omits it
    #[serde(default = "default_num_instances")]
    pub default_instances: usize,

    /// Default per-fleet resource budget
    #[serde(default)]
    pub budget: ResourceBudget,

    /// Completion watcher tuning
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Compute provider endpoint configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Object store endpoint configuration
    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_max_watchers() -> usize {
    30
}

const fn default_num_instances() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_watchers: default_max_watchers(),
            default_instances: default_num_instances(),
            budget: ResourceBudget::default(),
            watcher: WatcherConfig::default(),
            provider: ProviderConfig::default(),
            object_store: ObjectStoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Completion watcher tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WatcherConfig {
    /// Poll tick in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Seconds between group health probes
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,

    /// Bounded log-tail read size in lines
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: u32,
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_health_interval_secs() -> u64 {
    10
}

const fn default_log_tail_lines() -> u32 {
    50
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            health_interval_secs: default_health_interval_secs(),
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

/// Compute provider endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// Base URL of the compute API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Default region for new groups
    #[serde(default = "default_region")]
    pub region: String,

    /// Credential scope requested from the credential source
    #[serde(default = "default_compute_scope")]
    pub credential_scope: String,
}

fn default_provider_base_url() -> String {
    "http://localhost:7070".to_string()
}

fn default_region() -> String {
    "eastus".to_string()
}

fn default_compute_scope() -> String {
    "compute".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            region: default_region(),
            credential_scope: default_compute_scope(),
        }
    }
}

/// Object store endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObjectStoreConfig {
    /// Base URL of the object store API
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// Credential scope requested from the credential source
    #[serde(default = "default_store_scope")]
    pub credential_scope: String,
}

fn default_store_base_url() -> String {
    "http://localhost:7071".to_string()
}

fn default_store_scope() -> String {
    "storage".to_string()
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            credential_scope: default_store_scope(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
