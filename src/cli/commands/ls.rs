//! `flotilla ls` - list known container groups.

use anyhow::{bail, Result};

use crate::api;
use crate::application::FleetController;
use crate::cli::display;

pub async fn execute(controller: &FleetController, json_mode: bool) -> Result<()> {
    if json_mode {
        let response = api::list(controller).await;
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        if response.status != 200 {
            bail!("list call returned status {}", response.status);
        }
        return Ok(());
    }

    let groups = controller.list().await?;
    println!("{}", display::render_groups(&groups));
    Ok(())
}
