//! Command-line interface.

pub mod commands;
pub mod display;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use console::style;

use crate::adapters::rest::{RestComputeProvider, RestObjectStore, RestRemoteShell};
use crate::adapters::EnvCredentialSource;
use crate::application::FleetController;
use crate::domain::models::Config;
use crate::domain::ports::CredentialSource;
use crate::infrastructure::ConfigLoader;

pub use types::{Cli, Commands};

/// Load config from an explicit file or the hierarchical default chain.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Wire a controller against the REST adapters.
pub fn build_controller(config: &Config) -> FleetController {
    let credentials: Arc<dyn CredentialSource> = Arc::new(EnvCredentialSource::new());
    let provider = Arc::new(RestComputeProvider::new(
        config.provider.base_url.clone(),
        Arc::clone(&credentials),
        config.provider.credential_scope.clone(),
    ));
    let store = Arc::new(RestObjectStore::new(
        config.object_store.base_url.clone(),
        Arc::clone(&credentials),
        config.object_store.credential_scope.clone(),
    ));
    let shell = Arc::new(RestRemoteShell::new(
        config.provider.base_url.clone(),
        credentials,
        config.provider.credential_scope.clone(),
    ));
    FleetController::new(provider, store, shell, config.clone())
}

/// Print an error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let body = serde_json::json!({ "error": err.to_string() });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err:#}", style("error:").red().bold());
    }
    std::process::exit(1);
}
