//! `flotilla exec` - select groups and run a command on every container.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::api::{self, ExecRequest};
use crate::application::FleetController;
use crate::cli::display;

pub async fn execute(
    controller: &FleetController,
    pattern: String,
    task: String,
    wait: u64,
    targets_file: Option<PathBuf>,
    json_mode: bool,
) -> Result<()> {
    let targets = match targets_file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("cannot read targets file {}", path.display()))?;
            raw.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToString::to_string)
                .collect()
        }
        None => Vec::new(),
    };

    let request = ExecRequest {
        pattern: Some(pattern),
        command: Some(task),
        wait: Some(wait),
        targets,
    };

    let response = api::exec(controller, request).await;
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        if response.status != 200 {
            bail!("exec call returned status {}", response.status);
        }
        return Ok(());
    }

    if response.status != 200 {
        bail!("exec call failed ({}): {}", response.status, response.body);
    }
    let selected = response.body["selected"]
        .as_array()
        .map(Vec::len)
        .unwrap_or_default();
    println!("Selected {selected} group(s)");
    let outputs: BTreeMap<String, String> =
        serde_json::from_value(response.body["outputs"].clone()).unwrap_or_default();
    println!("{}", display::render_outputs(&outputs, &BTreeMap::new()));
    Ok(())
}
