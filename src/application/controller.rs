//! Fleet controller.
//!
//! Top-level orchestrator composing the distributor, provisioner,
//! dispatcher, watcher pool, and collector. One watcher task runs per
//! container on a bounded pool; the controller joins every task before
//! returning, so no watcher outlives the call that spawned it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use regex::Regex;
use tokio::sync::{mpsc, RwLock, Semaphore};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::collector::OutputCollector;
use crate::application::dispatcher::{CommandDispatcher, DispatchTarget};
use crate::application::distributor::InputDistributor;
use crate::application::provisioner::{
    ContainerGroupProvisioner, ProvisionReport, ProvisionRequest,
};
use crate::application::watcher::{CompletionWatcher, WatcherSettings};
use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::models::{Config, Fleet, GroupSummary, ShardRef, WatchReport};
use crate::domain::ports::{ComputeProvider, ObjectStore, RemoteShell};

/// Per-container aggregated outcome: either a collected result payload or
/// an error string, never both.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExecOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a fleet-create or single-run call.
#[derive(Debug, Clone)]
pub struct FleetOutcome {
    pub fleet: Fleet,
    pub groups: ProvisionReport,
    pub outputs: BTreeMap<String, ExecOutcome>,
}

/// Parameters for a fleet-create call.
#[derive(Debug, Clone, Default)]
pub struct FleetRequest {
    /// Fleet name; generated when absent.
    pub name: Option<String>,
    pub image: String,
    pub instance_count: usize,
    /// Command template; when absent the fleet is provisioned idle and no
    /// watchers run.
    pub task: Option<String>,
    /// Input target lines, sharded across instances.
    pub targets: Vec<String>,
    pub wait_budget_secs: Option<u64>,
    pub region: Option<String>,
    /// Best-effort group removal after outputs are collected.
    pub rm_when_done: bool,
}

/// A container picked up by `select`.
#[derive(Debug, Clone)]
struct SelectedContainer {
    group: String,
    container: String,
}

/// Top-level fleet orchestrator.
pub struct FleetController {
    provider: Arc<dyn ComputeProvider>,
    dispatcher: Arc<CommandDispatcher>,
    provisioner: ContainerGroupProvisioner,
    distributor: InputDistributor,
    watcher: Arc<CompletionWatcher>,
    collector: OutputCollector,
    config: Config,
    /// Active selection for subsequent `exec` calls.
    selection: RwLock<Vec<SelectedContainer>>,
}

impl FleetController {
    pub fn new(
        provider: Arc<dyn ComputeProvider>,
        store: Arc<dyn ObjectStore>,
        shell: Arc<dyn RemoteShell>,
        config: Config,
    ) -> Self {
        let dispatcher = Arc::new(CommandDispatcher::new(shell));
        let watcher = Arc::new(CompletionWatcher::new(
            Arc::clone(&provider),
            WatcherSettings::from(&config.watcher),
        ));
        Self {
            provisioner: ContainerGroupProvisioner::new(
                Arc::clone(&provider),
                Arc::clone(&dispatcher),
            ),
            distributor: InputDistributor::new(Arc::clone(&store)),
            collector: OutputCollector::new(store),
            provider,
            dispatcher,
            watcher,
            config,
            selection: RwLock::new(Vec::new()),
        }
    }

    /// Create a fleet: shard the targets, provision the groups, and (when
    /// a task was supplied) watch every container to a terminal state and
    /// aggregate its output.
    #[instrument(skip(self, request), fields(image = %request.image))]
    pub async fn fleet(&self, request: FleetRequest) -> FleetResult<FleetOutcome> {
        self.validate_fleet_request(&request)?;

        let fleet_name = request
            .name
            .clone()
            .unwrap_or_else(|| format!("fleet-{}", short_id()));
        let instances = if request.instance_count == 0 {
            self.config.default_instances
        } else {
            request.instance_count
        };
        let fleet = Fleet::new(&fleet_name, &request.image, instances, self.config.budget);

        let mut shards: VecDeque<ShardRef> = if request.targets.is_empty() {
            VecDeque::new()
        } else {
            self.distributor.stage(&request.targets, instances).await?
        };

        let provision = ProvisionRequest {
            fleet: fleet_name.clone(),
            instance_count: instances,
            image: request.image.clone(),
            budget: self.config.budget,
            region: request
                .region
                .clone()
                .unwrap_or_else(|| self.config.provider.region.clone()),
            command: request.task.clone(),
        };
        let report = self.provisioner.provision(&provision, &mut shards).await?;

        let outputs = if request.task.is_some() {
            let targets = report.created_containers();
            let reports = self.watch_all(targets, request.wait_budget_secs).await;
            self.resolve_outputs(reports).await
        } else {
            BTreeMap::new()
        };

        if request.rm_when_done {
            for group in report.groups.keys() {
                if let Err(err) = self.provider.delete(group).await {
                    warn!(group = %group, error = %err, "Post-run group removal failed");
                }
            }
        }

        info!(fleet = %fleet_name, instances, outputs = outputs.len(), "Fleet call finished");
        Ok(FleetOutcome { fleet, groups: report, outputs })
    }

    /// Single-instance variant of [`fleet`](Self::fleet).
    pub async fn run_single(
        &self,
        name: &str,
        image: &str,
        task: &str,
        duration_secs: Option<u64>,
        cleanup: bool,
        region: Option<String>,
    ) -> FleetResult<FleetOutcome> {
        self.fleet(FleetRequest {
            name: Some(name.to_string()),
            image: image.to_string(),
            instance_count: 1,
            task: Some(task.to_string()),
            targets: Vec::new(),
            wait_budget_secs: duration_secs,
            region,
            rm_when_done: cleanup,
        })
        .await
    }

    /// List the currently known container groups.
    pub async fn list(&self) -> FleetResult<Vec<GroupSummary>> {
        self.provider.list_groups().await
    }

    /// Match `pattern` (glob, `*` only) against known group names and
    /// store the matched containers as the active selection.
    ///
    /// Returns the matched group names.
    pub async fn select(&self, pattern: &str) -> FleetResult<Vec<String>> {
        let matcher = glob_to_regex(pattern)?;
        let groups = self.provider.list_groups().await?;

        let mut matched_names = Vec::new();
        let mut selected = Vec::new();
        for summary in groups {
            if matcher.is_match(&summary.name) {
                for container in &summary.container_names {
                    selected.push(SelectedContainer {
                        group: summary.name.clone(),
                        container: container.clone(),
                    });
                }
                matched_names.push(summary.name);
            }
        }

        info!(pattern = %pattern, matched = matched_names.len(), "Selection updated");
        *self.selection.write().await = selected;
        Ok(matched_names)
    }

    /// Dispatch `command` to every container in the active selection via
    /// the interactive strategy, watch them all concurrently, and return
    /// aggregated outputs after the pool joins.
    #[instrument(skip(self, command, targets))]
    pub async fn exec(
        &self,
        command: &str,
        wait_budget_secs: Option<u64>,
        targets: Vec<String>,
    ) -> FleetResult<BTreeMap<String, ExecOutcome>> {
        let selection = self.selection.read().await.clone();
        if selection.is_empty() {
            warn!("exec called with an empty selection");
            return Ok(BTreeMap::new());
        }

        let mut shards: VecDeque<ShardRef> = if targets.is_empty() {
            VecDeque::new()
        } else {
            self.distributor.stage(&targets, selection.len()).await?
        };

        let strategy = self.dispatcher.for_state(true);
        let mut watch_targets = Vec::with_capacity(selection.len());
        let mut dispatch_failures = BTreeMap::new();
        for sel in &selection {
            let target = DispatchTarget {
                group: sel.group.clone(),
                container: sel.container.clone(),
                input: shards.pop_front(),
            };
            // A failed injection lands in that container's entry; it never
            // aborts the sibling dispatches.
            match strategy.dispatch(&target, command).await {
                Ok(_) => watch_targets.push((sel.group.clone(), sel.container.clone())),
                Err(err) => {
                    warn!(container = %sel.container, error = %err, "Dispatch failed");
                    dispatch_failures.insert(
                        sel.container.clone(),
                        ExecOutcome { result: None, error: Some(err.to_string()) },
                    );
                }
            }
        }

        let reports = self.watch_all(watch_targets, wait_budget_secs).await;
        let mut outputs = self.resolve_outputs(reports).await;
        outputs.extend(dispatch_failures);
        Ok(outputs)
    }

    /// Glob-match group names and delete each independently. One group's
    /// failure never blocks the others; each outcome is reported on its
    /// own. "Not found" counts as already absent, not as an error.
    pub async fn remove(&self, pattern: &str) -> FleetResult<BTreeMap<String, bool>> {
        let matcher = glob_to_regex(pattern)?;
        let groups = self.provider.list_groups().await?;

        let mut outcomes = BTreeMap::new();
        for summary in groups {
            if !matcher.is_match(&summary.name) {
                continue;
            }
            match self.provider.delete(&summary.name).await {
                Ok(_) => {
                    outcomes.insert(summary.name, true);
                }
                Err(err) => {
                    warn!(group = %summary.name, error = %err, "Group deletion failed");
                    outcomes.insert(summary.name, false);
                }
            }
        }
        Ok(outcomes)
    }

    /// Run one watcher per (group, container) on the bounded pool and
    /// join. Reports flow through a channel drained after the join, so no
    /// shared mutable map is ever touched from pool tasks.
    async fn watch_all(
        &self,
        targets: Vec<(String, String)>,
        wait_budget_secs: Option<u64>,
    ) -> Vec<WatchReport> {
        let (tx, mut rx) = mpsc::channel(targets.len().max(1));
        let semaphore = Arc::new(Semaphore::new(self.config.max_watchers));
        let mut handles = Vec::with_capacity(targets.len());

        for (group, container) in targets {
            let watcher = Arc::clone(&self.watcher);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let report = watcher.watch(&group, &container, wait_budget_secs).await;
                let _ = tx.send(report).await;
            }));
        }
        drop(tx);

        // Join every watcher before draining; none outlives this call.
        futures::future::join_all(handles).await;

        let mut reports = Vec::new();
        while let Some(report) = rx.recv().await {
            reports.push(report);
        }
        reports
    }

    /// Resolve DONE tokens into stored payloads; fold collection errors
    /// and watch errors into the per-container entry.
    async fn resolve_outputs(&self, reports: Vec<WatchReport>) -> BTreeMap<String, ExecOutcome> {
        let mut outputs = BTreeMap::new();
        for report in reports {
            let outcome = match (report.token, report.error) {
                (Some(token), _) => match self.collector.collect(&token).await {
                    Ok(payload) => ExecOutcome {
                        result: Some(String::from_utf8_lossy(&payload).into_owned()),
                        error: None,
                    },
                    Err(err) => ExecOutcome { result: None, error: Some(err.to_string()) },
                },
                (None, error) => ExecOutcome { result: None, error },
            };
            outputs.insert(report.container, outcome);
        }
        outputs
    }

    fn validate_fleet_request(&self, request: &FleetRequest) -> FleetResult<()> {
        let mut missing = Vec::new();
        if request.image.trim().is_empty() {
            missing.push("image".to_string());
        }
        if !missing.is_empty() {
            return Err(FleetError::Validation(missing));
        }
        Ok(())
    }
}

/// Translate a glob pattern (`*` wildcard only) into a fully anchored
/// regular expression.
pub fn glob_to_regex(pattern: &str) -> FleetResult<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .map_err(|e| FleetError::Validation(vec![format!("pattern: {e}")]))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_star_is_the_only_wildcard() {
        let matcher = glob_to_regex("fleet*").unwrap();
        assert!(matcher.is_match("fleet-01"));
        assert!(matcher.is_match("fleet-02"));
        assert!(!matcher.is_match("other-fleet"));

        // Dots are literal, not regex metacharacters.
        let matcher = glob_to_regex("a.b*").unwrap();
        assert!(matcher.is_match("a.b-01"));
        assert!(!matcher.is_match("aXb-01"));
    }

    #[test]
    fn glob_match_is_fully_anchored() {
        let matcher = glob_to_regex("x1").unwrap();
        assert!(matcher.is_match("x1"));
        assert!(!matcher.is_match("x12"));
        assert!(!matcher.is_match("ax1"));
    }
}
