//! Compute provider port - interface for the container-group API.

use async_trait::async_trait;

use crate::domain::errors::FleetResult;
use crate::domain::models::{ContainerGroupSpec, GroupStatus, GroupSummary};

/// Opaque handle returned once a group's creation call completes.
#[derive(Debug, Clone)]
pub struct GroupHandle {
    pub name: String,
    pub id: String,
}

/// Trait for compute provider implementations.
///
/// One group's creation is a single batched call, treated as atomic from
/// the orchestrator's viewpoint: `create_or_update` blocks until the
/// provider reports the provisioning operation finished.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Create or update a container group. Blocks until provisioning
    /// completes on the provider side.
    async fn create_or_update(&self, spec: &ContainerGroupSpec) -> FleetResult<GroupHandle>;

    /// Delete a group by name. Returns `false` when the group was already
    /// absent; "not found" is not an error.
    async fn delete(&self, group: &str) -> FleetResult<bool>;

    /// Fetch a bounded log tail for one container.
    async fn get_logs(&self, group: &str, container: &str, tail: u32) -> FleetResult<String>;

    /// Fetch the provisioning state and instance views for a group.
    async fn get_group(&self, group: &str) -> FleetResult<GroupStatus>;

    /// List the currently known container groups.
    async fn list_groups(&self) -> FleetResult<Vec<GroupSummary>>;
}
