//! Container group provisioner.
//!
//! Deploys a fleet's containers in chunks that respect the provider's
//! per-group size ceiling. Groups are submitted sequentially, blocking on
//! each creation call, to stay inside provider rate and quota limits.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::application::dispatcher::{CommandDispatcher, DispatchTarget};
use crate::domain::errors::FleetResult;
use crate::domain::models::{
    chunk_indices, group_name, ContainerGroupSpec, ContainerSpec, ResourceBudget, ShardRef,
};
use crate::domain::ports::ComputeProvider;

/// One provisioning request.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub fleet: String,
    pub instance_count: usize,
    pub image: String,
    pub budget: ResourceBudget,
    pub region: String,
    /// Command template embedded at boot, when present.
    pub command: Option<String>,
}

/// Per-group, per-container creation outcome. A provisioning error aborts
/// the remaining blocks but already-created groups stay in the report, so
/// callers always observe partial success rather than a rollback.
#[derive(Debug, Clone, Default)]
pub struct ProvisionReport {
    pub groups: BTreeMap<String, BTreeMap<String, bool>>,
    /// Error message of the block that aborted provisioning, if any.
    pub aborted: Option<String>,
}

impl ProvisionReport {
    /// Containers that were actually created, as (group, container) pairs.
    pub fn created_containers(&self) -> Vec<(String, String)> {
        self.groups
            .iter()
            .flat_map(|(group, members)| {
                members
                    .iter()
                    .filter(|(_, ok)| **ok)
                    .map(move |(name, _)| (group.clone(), name.clone()))
            })
            .collect()
    }
}

/// Deploys container groups in bounded chunks.
pub struct ContainerGroupProvisioner {
    provider: Arc<dyn ComputeProvider>,
    dispatcher: Arc<CommandDispatcher>,
}

impl ContainerGroupProvisioner {
    pub fn new(provider: Arc<dyn ComputeProvider>, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { provider, dispatcher }
    }

    /// Partition the fleet into groups of at most `MAX_GROUP_SIZE`, compute
    /// per-instance resource shares, attach one shard per instance off the
    /// front of `shards`, and submit each group in order.
    ///
    /// Unconsumed shards remain in the queue for the caller.
    #[instrument(skip(self, request, shards), fields(fleet = %request.fleet, instances = request.instance_count))]
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        shards: &mut VecDeque<ShardRef>,
    ) -> FleetResult<ProvisionReport> {
        let share = request.budget.share_for(request.instance_count);
        let blocks = chunk_indices(request.instance_count);
        let mut report = ProvisionReport::default();

        info!(
            groups = blocks.len(),
            cpu_share = share.cpu,
            memory_share = share.memory_gb,
            "Provisioning fleet"
        );

        for (block_idx, block) in blocks.iter().enumerate() {
            let gname = group_name(&request.fleet, block_idx + 1);
            let mut containers = Vec::with_capacity(block.len());

            for &index in block {
                let mut spec =
                    ContainerSpec::new(&request.fleet, index, &request.image, share);
                if let Some(shard) = shards.pop_front() {
                    spec.assign_shard(shard);
                }
                if let Some(command) = &request.command {
                    self.embed_command(&gname, &mut spec, command).await?;
                }
                containers.push(spec);
            }

            let group = ContainerGroupSpec {
                name: gname.clone(),
                fleet: request.fleet.clone(),
                region: request.region.clone(),
                containers,
            };

            // Sequential submission: block on this group before the next.
            match self.provider.create_or_update(&group).await {
                Ok(handle) => {
                    info!(group = %handle.name, members = group.containers.len(), "Group created");
                    report.groups.insert(
                        gname,
                        group.containers.iter().map(|c| (c.name.clone(), true)).collect(),
                    );
                }
                Err(err) => {
                    // No rollback of earlier groups; abort the rest of the
                    // request and leave cleanup to the caller.
                    error!(group = %gname, error = %err, "Group creation failed, aborting remaining blocks");
                    report.groups.insert(
                        gname,
                        group.containers.iter().map(|c| (c.name.clone(), false)).collect(),
                    );
                    report.aborted = Some(err.to_string());
                    break;
                }
            }
        }

        if !shards.is_empty() {
            warn!(remaining = shards.len(), "Unconsumed input shards after provisioning");
        }
        Ok(report)
    }

    /// Run the at-boot dispatch strategy for a container that does not
    /// exist yet and bake the resulting entrypoint into its spec.
    async fn embed_command(
        &self,
        group: &str,
        spec: &mut ContainerSpec,
        command: &str,
    ) -> FleetResult<()> {
        let target = DispatchTarget {
            group: group.to_string(),
            container: spec.name.clone(),
            input: spec.shard.clone(),
        };
        let ticket = self.dispatcher.for_state(false).dispatch(&target, command).await?;
        spec.command = ticket.entrypoint;
        spec.environment.extend(ticket.environment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockComputeProvider, MockRemoteShell};

    fn provisioner(provider: Arc<MockComputeProvider>) -> ContainerGroupProvisioner {
        let dispatcher = Arc::new(CommandDispatcher::new(Arc::new(MockRemoteShell::new())));
        ContainerGroupProvisioner::new(provider, dispatcher)
    }

    fn request(instances: usize, command: Option<&str>) -> ProvisionRequest {
        ProvisionRequest {
            fleet: "scan".to_string(),
            instance_count: instances,
            image: "scanner:latest".to_string(),
            budget: ResourceBudget::new(16.0, 16.0),
            region: "eastus".to_string(),
            command: command.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn provisions_in_blocks_of_at_most_ten() {
        let provider = Arc::new(MockComputeProvider::new());
        let report = provisioner(provider.clone())
            .provision(&request(23, None), &mut VecDeque::new())
            .await
            .unwrap();

        assert_eq!(report.groups.len(), 3);
        assert!(report.aborted.is_none());

        let sizes: Vec<usize> = report.groups.values().map(BTreeMap::len).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 23);
        assert!(sizes.iter().all(|&s| (1..=10).contains(&s)));

        // Submission order is recorded by the mock.
        let submitted = provider.submitted_groups().await;
        assert_eq!(submitted, vec!["scan-01", "scan-02", "scan-03"]);
    }

    #[tokio::test]
    async fn shards_are_consumed_in_creation_order() {
        let provider = Arc::new(MockComputeProvider::new());
        let mut shards: VecDeque<ShardRef> =
            (0..3).map(|i| ShardRef::new(format!("shard-{i}"), 10)).collect();

        provisioner(provider.clone())
            .provision(&request(3, Some("run-scan")), &mut shards)
            .await
            .unwrap();

        assert!(shards.is_empty());
        let specs = provider.submitted_specs().await;
        let env_refs: Vec<String> = specs[0]
            .containers
            .iter()
            .map(|c| c.environment["FLOTILLA_SHARD_REF"].clone())
            .collect();
        assert_eq!(env_refs, vec!["shard-0", "shard-1", "shard-2"]);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_blocks_without_rollback() {
        let provider = Arc::new(MockComputeProvider::new());
        provider.fail_group("scan-02", "quota exceeded").await;

        let report = provisioner(provider.clone())
            .provision(&request(25, None), &mut VecDeque::new())
            .await
            .unwrap();

        // First group created, second failed, third never attempted.
        assert_eq!(report.groups.len(), 2);
        assert!(report.groups["scan-01"].values().all(|ok| *ok));
        assert!(report.groups["scan-02"].values().all(|ok| !*ok));
        assert!(report.aborted.as_deref().unwrap().contains("quota exceeded"));

        let submitted = provider.submitted_groups().await;
        assert_eq!(submitted, vec!["scan-01", "scan-02"]);
        // The created group is still standing; no delete was issued.
        assert!(provider.deleted_groups().await.is_empty());
    }

    #[tokio::test]
    async fn command_is_embedded_at_boot() {
        let provider = Arc::new(MockComputeProvider::new());
        provisioner(provider.clone())
            .provision(&request(2, Some("run-scan --fast")), &mut VecDeque::new())
            .await
            .unwrap();

        let specs = provider.submitted_specs().await;
        for container in &specs[0].containers {
            assert!(container.command[2].contains("run-scan --fast"));
            assert!(container.environment.contains_key("FLOTILLA_RESULT_TOKEN"));
        }
    }
}
