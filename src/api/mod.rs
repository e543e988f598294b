//! Transport-neutral request/response surface.
//!
//! The CLI and any remote-invocation entry point share these shapes.
//! Status semantics: 200 on success, 400 with the enumerated missing
//! fields, 500 with `{message, kind, trace}` for anything unhandled.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::application::{ExecOutcome, FleetController, FleetRequest};
use crate::domain::errors::FleetError;

/// Create-fleet request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFleetRequest {
    pub image: Option<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    pub task: Option<String>,
    pub fleet_name: Option<String>,
    pub num_instances: Option<usize>,
    pub region: Option<String>,
    #[serde(default)]
    pub rm_when_done: bool,
    pub wait: Option<u64>,
}

/// Run-single-instance request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInstanceRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub task: Option<String>,
    pub duration: Option<u64>,
    #[serde(default)]
    pub cleanup: bool,
    pub region: Option<String>,
}

/// Remove request body. `name` is a glob pattern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub name: Option<String>,
}

/// Exec-on-selection request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecRequest {
    pub pattern: Option<String>,
    pub command: Option<String>,
    pub wait: Option<u64>,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// A status-tagged JSON response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn bad_request(missing: &[String]) -> Self {
        Self {
            status: 400,
            body: json!({ "error": "missing required fields", "missing": missing }),
        }
    }

    pub fn internal(err: &FleetError) -> Self {
        error!(kind = err.kind(), error = %err, "Request failed");
        Self {
            status: 500,
            body: json!({
                "message": err.to_string(),
                "kind": err.kind(),
                "trace": format!("{err:?}"),
            }),
        }
    }

    fn from_error(err: FleetError) -> Self {
        match err {
            FleetError::Validation(missing) => Self::bad_request(&missing),
            other => Self::internal(&other),
        }
    }
}

/// Collapse per-container outcomes into the `map<container, string>` shape
/// the exposed surface uses.
fn flatten_outputs(
    outputs: &std::collections::BTreeMap<String, ExecOutcome>,
) -> std::collections::BTreeMap<String, String> {
    outputs
        .iter()
        .map(|(container, outcome)| {
            let text = outcome
                .result
                .clone()
                .or_else(|| outcome.error.clone())
                .unwrap_or_default();
            (container.clone(), text)
        })
        .collect()
}

/// Create a fleet and wait for its outputs.
pub async fn create_fleet(
    controller: &FleetController,
    request: CreateFleetRequest,
) -> ApiResponse {
    let mut missing = Vec::new();
    if request.image.as_deref().is_none_or(str::is_empty) {
        missing.push("image".to_string());
    }
    if request.task.as_deref().is_none_or(str::is_empty) {
        missing.push("task".to_string());
    }
    if !missing.is_empty() {
        return ApiResponse::bad_request(&missing);
    }

    let fleet_request = FleetRequest {
        name: request.fleet_name,
        image: request.image.unwrap_or_default(),
        instance_count: request.num_instances.unwrap_or(0),
        task: request.task,
        targets: request.targets,
        wait_budget_secs: request.wait,
        region: request.region,
        rm_when_done: request.rm_when_done,
    };

    match controller.fleet(fleet_request).await {
        Ok(outcome) => ApiResponse::ok(json!({
            "fleetName": outcome.fleet.name,
            "instances": outcome.fleet.instance_count,
            "image": outcome.fleet.image,
            "groups": outcome.groups.groups,
            "outputs": flatten_outputs(&outcome.outputs),
        })),
        Err(err) => ApiResponse::from_error(err),
    }
}

/// Run a single named instance.
pub async fn run_instance(
    controller: &FleetController,
    request: RunInstanceRequest,
) -> ApiResponse {
    let mut missing = Vec::new();
    if request.name.as_deref().is_none_or(str::is_empty) {
        missing.push("name".to_string());
    }
    if request.image.as_deref().is_none_or(str::is_empty) {
        missing.push("image".to_string());
    }
    if request.task.as_deref().is_none_or(str::is_empty) {
        missing.push("task".to_string());
    }
    if !missing.is_empty() {
        return ApiResponse::bad_request(&missing);
    }

    let result = controller
        .run_single(
            &request.name.unwrap_or_default(),
            &request.image.unwrap_or_default(),
            &request.task.unwrap_or_default(),
            request.duration,
            request.cleanup,
            request.region,
        )
        .await;

    match result {
        Ok(outcome) => ApiResponse::ok(json!({
            "fleetName": outcome.fleet.name,
            "instances": outcome.fleet.instance_count,
            "image": outcome.fleet.image,
            "outputs": flatten_outputs(&outcome.outputs),
        })),
        Err(err) => ApiResponse::from_error(err),
    }
}

/// List known container groups.
pub async fn list(controller: &FleetController) -> ApiResponse {
    match controller.list().await {
        Ok(groups) => {
            let instances: Vec<Value> = groups
                .iter()
                .flat_map(|g| {
                    g.container_names.iter().map(move |c| {
                        json!({ "group": g.name, "container": c })
                    })
                })
                .collect();
            ApiResponse::ok(json!({ "instances": instances }))
        }
        Err(err) => ApiResponse::from_error(err),
    }
}

/// Remove groups matching a glob pattern.
pub async fn remove(controller: &FleetController, request: RemoveRequest) -> ApiResponse {
    let Some(pattern) = request.name.filter(|n| !n.is_empty()) else {
        return ApiResponse::bad_request(&["name".to_string()]);
    };

    match controller.remove(&pattern).await {
        Ok(outcomes) => {
            let removed: Vec<String> = outcomes
                .iter()
                .filter(|(_, ok)| **ok)
                .map(|(name, _)| name.clone())
                .collect();
            let success = outcomes.values().all(|ok| *ok);
            ApiResponse::ok(json!({
                "result": {
                    "removed": removed,
                    "success": success,
                    "outcomes": outcomes,
                }
            }))
        }
        Err(err) => ApiResponse::from_error(err),
    }
}

/// Select groups by pattern, then dispatch a command to every container
/// in the selection.
pub async fn exec(controller: &FleetController, request: ExecRequest) -> ApiResponse {
    let mut missing = Vec::new();
    if request.pattern.as_deref().is_none_or(str::is_empty) {
        missing.push("pattern".to_string());
    }
    if request.command.as_deref().is_none_or(str::is_empty) {
        missing.push("command".to_string());
    }
    if !missing.is_empty() {
        return ApiResponse::bad_request(&missing);
    }

    let pattern = request.pattern.unwrap_or_default();
    let command = request.command.unwrap_or_default();

    let selected = match controller.select(&pattern).await {
        Ok(selected) => selected,
        Err(err) => return ApiResponse::from_error(err),
    };

    match controller.exec(&command, request.wait, request.targets).await {
        Ok(outputs) => ApiResponse::ok(json!({
            "selected": selected,
            "outputs": flatten_outputs(&outputs),
        })),
        Err(err) => ApiResponse::from_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_enumerated() {
        let response = ApiResponse::bad_request(&["image".to_string(), "task".to_string()]);
        assert_eq!(response.status, 400);
        assert_eq!(response.body["missing"][0], "image");
        assert_eq!(response.body["missing"][1], "task");
    }

    #[test]
    fn internal_errors_carry_kind_and_trace() {
        let err = FleetError::Provider("boom".to_string());
        let response = ApiResponse::internal(&err);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["kind"], "ProviderError");
        assert!(response.body["trace"].as_str().unwrap().contains("boom"));
    }
}
