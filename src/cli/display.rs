//! Table rendering for list and output display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use std::collections::BTreeMap;

use crate::domain::models::GroupSummary;

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render known groups with one row per container.
pub fn render_groups(groups: &[GroupSummary]) -> String {
    if groups.is_empty() {
        return "No container groups found.".to_string();
    }
    let mut table = list_table(&["group", "state", "container"]);
    for group in groups {
        if group.container_names.is_empty() {
            table.add_row(vec![
                group.name.clone(),
                format!("{:?}", group.provisioning_state),
                "-".to_string(),
            ]);
        }
        for container in &group.container_names {
            table.add_row(vec![
                group.name.clone(),
                format!("{:?}", group.provisioning_state),
                container.clone(),
            ]);
        }
    }
    let count = groups.len();
    format!(
        "{} group{}:\n{table}",
        style(count).bold(),
        if count == 1 { "" } else { "s" }
    )
}

/// Render per-container outputs, errors styled red.
pub fn render_outputs(outputs: &BTreeMap<String, String>, errors: &BTreeMap<String, bool>) -> String {
    if outputs.is_empty() {
        return "No outputs.".to_string();
    }
    let mut table = list_table(&["container", "output"]);
    for (container, text) in outputs {
        let is_error = errors.get(container).copied().unwrap_or(false);
        let cell = if is_error {
            style(text.clone()).red().to_string()
        } else {
            text.clone()
        };
        table.add_row(vec![container.clone(), cell]);
    }
    table.to_string()
}
