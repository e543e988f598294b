//! `flotilla rm` - remove groups matching a glob pattern.

use anyhow::{bail, Result};
use console::style;

use crate::api::{self, RemoveRequest};
use crate::application::FleetController;

pub async fn execute(
    controller: &FleetController,
    pattern: String,
    json_mode: bool,
) -> Result<()> {
    let response = api::remove(controller, RemoveRequest { name: Some(pattern) }).await;
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        if response.status != 200 {
            bail!("rm call returned status {}", response.status);
        }
        return Ok(());
    }

    if response.status != 200 {
        bail!("rm call failed ({}): {}", response.status, response.body);
    }

    let outcomes = response.body["result"]["outcomes"]
        .as_object()
        .cloned()
        .unwrap_or_default();
    if outcomes.is_empty() {
        println!("No groups matched.");
        return Ok(());
    }
    for (group, ok) in outcomes {
        if ok.as_bool().unwrap_or(false) {
            println!("{} {group}", style("removed").green());
        } else {
            println!("{} {group}", style("failed ").red());
        }
    }
    Ok(())
}
