//! `flotilla init` - write the default project configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use console::style;

use crate::domain::models::Config;

const CONFIG_DIR: &str = ".flotilla";
const CONFIG_FILE: &str = ".flotilla/config.yaml";

pub async fn execute(force: bool, json_mode: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() && !force {
        bail!("{CONFIG_FILE} already exists; pass --force to overwrite");
    }

    tokio::fs::create_dir_all(CONFIG_DIR)
        .await
        .with_context(|| format!("cannot create {CONFIG_DIR}"))?;

    let rendered = serde_yaml::to_string(&Config::default())
        .context("cannot serialize default configuration")?;
    tokio::fs::write(config_path, rendered)
        .await
        .with_context(|| format!("cannot write {CONFIG_FILE}"))?;

    if json_mode {
        println!("{}", serde_json::json!({ "initialized": CONFIG_FILE }));
    } else {
        println!("{} wrote {CONFIG_FILE}", style("ok").green().bold());
    }
    Ok(())
}
