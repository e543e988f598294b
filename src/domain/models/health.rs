//! Provider-reported group health.

use serde::{Deserialize, Serialize};

/// Provider-side provisioning state of a container group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    Pending,
    Creating,
    Succeeded,
    Failed,
    Unknown,
}

/// Instance-reported runtime view. All fields are optional because the
/// provider frequently omits them while a group is still settling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceView {
    pub name: String,

    /// Runtime state string as reported (`Running`, `Failed`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Recent provider events for the instance.
    #[serde(default)]
    pub events: Vec<GroupEvent>,
}

impl InstanceView {
    pub fn is_failed(&self) -> bool {
        self.state.as_deref() == Some("Failed")
            || self.events.iter().any(GroupEvent::is_error)
    }
}

/// One provider event attached to a group or instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEvent {
    /// Event kind (`Normal`, `Warning`, `Error`).
    pub kind: String,
    pub message: String,
}

impl GroupEvent {
    pub fn is_error(&self) -> bool {
        self.kind.eq_ignore_ascii_case("error")
    }
}

/// Snapshot returned by the health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatus {
    pub name: String,
    pub provisioning_state: ProvisioningState,

    /// Per-instance views; may be absent entirely.
    #[serde(default)]
    pub instances: Vec<InstanceView>,
}

impl GroupStatus {
    /// Whether the probe result is terminal for `container`.
    ///
    /// A failed provisioning state fails every member. An instance-level
    /// failure only fails the named container. Missing instance views are
    /// not an error; the caller keeps polling.
    pub fn failure_reason(&self, container: &str) -> Option<String> {
        if self.provisioning_state == ProvisioningState::Failed {
            return Some(format!("group '{}' provisioning failed", self.name));
        }
        let view = self.instances.iter().find(|v| v.name == container)?;
        if view.is_failed() {
            let detail = view
                .events
                .iter()
                .find(|e| e.is_error())
                .map_or_else(|| "instance reported Failed".to_string(), |e| e.message.clone());
            return Some(detail);
        }
        None
    }
}

/// Compact listing entry for known groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub provisioning_state: ProvisioningState,
    pub container_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_provisioning_fails_every_container() {
        let status = GroupStatus {
            name: "scan-01".to_string(),
            provisioning_state: ProvisioningState::Failed,
            instances: vec![],
        };
        assert!(status.failure_reason("scan-03").is_some());
    }

    #[test]
    fn instance_failure_is_scoped_to_the_container() {
        let status = GroupStatus {
            name: "scan-01".to_string(),
            provisioning_state: ProvisioningState::Succeeded,
            instances: vec![
                InstanceView {
                    name: "scan-01".to_string(),
                    state: Some("Failed".to_string()),
                    events: vec![],
                },
                InstanceView {
                    name: "scan-02".to_string(),
                    state: Some("Running".to_string()),
                    events: vec![],
                },
            ],
        };
        assert!(status.failure_reason("scan-01").is_some());
        assert!(status.failure_reason("scan-02").is_none());
    }

    #[test]
    fn error_event_surfaces_its_message() {
        let status = GroupStatus {
            name: "scan-01".to_string(),
            provisioning_state: ProvisioningState::Succeeded,
            instances: vec![InstanceView {
                name: "scan-01".to_string(),
                state: Some("Running".to_string()),
                events: vec![GroupEvent {
                    kind: "Error".to_string(),
                    message: "OOMKilled".to_string(),
                }],
            }],
        };
        assert_eq!(status.failure_reason("scan-01").as_deref(), Some("OOMKilled"));
    }

    #[test]
    fn missing_instance_view_is_not_a_failure() {
        let status = GroupStatus {
            name: "scan-01".to_string(),
            provisioning_state: ProvisioningState::Creating,
            instances: vec![],
        };
        assert!(status.failure_reason("scan-01").is_none());
    }
}
