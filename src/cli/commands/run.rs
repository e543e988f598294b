//! `flotilla run` - run a task on a single named instance.

use anyhow::{bail, Result};

use crate::api::{self, RunInstanceRequest};
use crate::application::FleetController;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    controller: &FleetController,
    name: String,
    image: String,
    task: String,
    duration: Option<u64>,
    cleanup: bool,
    region: Option<String>,
    json_mode: bool,
) -> Result<()> {
    let request = RunInstanceRequest {
        name: Some(name),
        image: Some(image),
        task: Some(task),
        duration,
        cleanup,
        region,
    };

    let response = api::run_instance(controller, request).await;
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
    } else if response.status == 200 {
        let outputs = &response.body["outputs"];
        match outputs.as_object().and_then(|m| m.values().next()) {
            Some(output) => println!("{}", output.as_str().unwrap_or_default()),
            None => println!("No output."),
        }
    }
    if response.status != 200 {
        bail!("run call failed ({}): {}", response.status, response.body);
    }
    Ok(())
}
