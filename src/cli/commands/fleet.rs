//! `flotilla fleet` - create a fleet and run a task across it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::api::{self, CreateFleetRequest};
use crate::application::FleetController;
use crate::cli::display;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    controller: &FleetController,
    image: String,
    task: String,
    name: Option<String>,
    instances: usize,
    targets_file: Option<PathBuf>,
    wait: Option<u64>,
    region: Option<String>,
    rm_when_done: bool,
    json_mode: bool,
) -> Result<()> {
    let targets = match targets_file {
        Some(path) => read_targets(&path).await?,
        None => Vec::new(),
    };

    let request = CreateFleetRequest {
        image: Some(image),
        targets,
        task: Some(task),
        fleet_name: name,
        num_instances: Some(instances),
        region,
        rm_when_done,
        wait,
    };

    let response = api::create_fleet(controller, request).await;
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        if response.status != 200 {
            bail!("fleet call returned status {}", response.status);
        }
        return Ok(());
    }

    if response.status != 200 {
        bail!("fleet call failed ({}): {}", response.status, response.body);
    }

    println!(
        "Fleet {} ({} instance(s), image {})",
        response.body["fleetName"].as_str().unwrap_or("?"),
        response.body["instances"],
        response.body["image"].as_str().unwrap_or("?"),
    );
    let outputs: BTreeMap<String, String> =
        serde_json::from_value(response.body["outputs"].clone()).unwrap_or_default();
    println!("{}", display::render_outputs(&outputs, &BTreeMap::new()));
    Ok(())
}

async fn read_targets(path: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read targets file {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect())
}
