//! Wire DTOs for the REST compute and object-store adapters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::models::{
    ContainerGroupSpec, GroupEvent, GroupStatus, GroupSummary, InstanceView, ProvisioningState,
};

#[derive(Debug, Serialize)]
pub struct GroupSpecDto {
    pub name: String,
    pub region: String,
    pub containers: Vec<ContainerDto>,
}

#[derive(Debug, Serialize)]
pub struct ContainerDto {
    pub name: String,
    pub image: String,
    pub cpu: f64,
    pub memory_gb: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,
}

impl From<&ContainerGroupSpec> for GroupSpecDto {
    fn from(spec: &ContainerGroupSpec) -> Self {
        Self {
            name: spec.name.clone(),
            region: spec.region.clone(),
            containers: spec
                .containers
                .iter()
                .map(|c| ContainerDto {
                    name: c.name.clone(),
                    image: c.image.clone(),
                    cpu: c.resources.cpu,
                    memory_gb: c.resources.memory_gb,
                    command: c.command.clone(),
                    environment: c.environment.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateResponseDto {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupStatusDto {
    pub name: String,
    pub provisioning_state: String,
    #[serde(default)]
    pub instances: Vec<InstanceDto>,
}

#[derive(Debug, Deserialize)]
pub struct InstanceDto {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub events: Vec<EventDto>,
}

#[derive(Debug, Deserialize)]
pub struct EventDto {
    pub kind: String,
    pub message: String,
}

fn parse_state(raw: &str) -> ProvisioningState {
    match raw {
        "Pending" => ProvisioningState::Pending,
        "Creating" => ProvisioningState::Creating,
        "Succeeded" => ProvisioningState::Succeeded,
        "Failed" => ProvisioningState::Failed,
        _ => ProvisioningState::Unknown,
    }
}

impl From<GroupStatusDto> for GroupStatus {
    fn from(dto: GroupStatusDto) -> Self {
        Self {
            name: dto.name,
            provisioning_state: parse_state(&dto.provisioning_state),
            instances: dto
                .instances
                .into_iter()
                .map(|i| InstanceView {
                    name: i.name,
                    state: i.state,
                    events: i
                        .events
                        .into_iter()
                        .map(|e| GroupEvent { kind: e.kind, message: e.message })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupListDto {
    pub groups: Vec<GroupSummaryDto>,
}

#[derive(Debug, Deserialize)]
pub struct GroupSummaryDto {
    pub name: String,
    pub provisioning_state: String,
    #[serde(default)]
    pub containers: Vec<String>,
}

impl From<GroupSummaryDto> for GroupSummary {
    fn from(dto: GroupSummaryDto) -> Self {
        Self {
            name: dto.name,
            provisioning_state: parse_state(&dto.provisioning_state),
            container_names: dto.containers,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct KeyDto {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ExecRequestDto<'a> {
    pub script: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_states_do_not_fail_decoding() {
        let dto = GroupStatusDto {
            name: "g".to_string(),
            provisioning_state: "Repairing".to_string(),
            instances: vec![],
        };
        let status: GroupStatus = dto.into();
        assert_eq!(status.provisioning_state, ProvisioningState::Unknown);
    }
}
