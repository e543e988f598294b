//! In-memory mock adapters for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::models::{
    ContainerGroupSpec, GroupStatus, GroupSummary, ProvisioningState,
};
use crate::domain::ports::{
    ComputeProvider, Credential, CredentialSource, GroupHandle, ObjectStore, RemoteShell,
};

/// Scripted log behavior for one (group, container) pair.
#[derive(Debug, Clone)]
enum LogScript {
    /// Same tail on every fetch.
    Static(String),
    /// One entry per fetch; the last entry repeats.
    Sequence(Vec<String>),
    /// Every fetch fails.
    Fail(String),
}

/// Mock compute provider with scripted logs, health states, and failures.
#[derive(Default)]
pub struct MockComputeProvider {
    groups: RwLock<HashMap<String, ContainerGroupSpec>>,
    submitted: RwLock<Vec<ContainerGroupSpec>>,
    deleted: RwLock<Vec<String>>,
    create_failures: RwLock<HashMap<String, String>>,
    delete_failures: RwLock<HashMap<String, String>>,
    logs: RwLock<HashMap<(String, String), LogScript>>,
    log_cursors: RwLock<HashMap<(String, String), usize>>,
    statuses: RwLock<HashMap<String, GroupStatus>>,
    health_failures: RwLock<HashMap<String, String>>,
}

impl MockComputeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a known group without going through `create_or_update`.
    /// Container names are kept verbatim.
    pub async fn seed_group(&self, name: &str, containers: &[&str]) {
        use crate::domain::models::{ContainerSpec, ResourceBudget};

        let share = ResourceBudget::default().share_for(containers.len().max(1));
        let spec = ContainerGroupSpec {
            name: name.to_string(),
            fleet: name.to_string(),
            region: "eastus".to_string(),
            containers: containers
                .iter()
                .map(|c| {
                    let mut spec = ContainerSpec::new(c, 1, "mock:latest", share);
                    spec.name = (*c).to_string();
                    spec
                })
                .collect(),
        };
        self.groups.write().await.insert(name.to_string(), spec);
    }

    pub async fn set_logs(&self, group: &str, container: &str, tail: &str) {
        self.logs.write().await.insert(
            (group.to_string(), container.to_string()),
            LogScript::Static(tail.to_string()),
        );
    }

    pub async fn set_log_sequence(&self, group: &str, container: &str, tails: Vec<String>) {
        self.logs.write().await.insert(
            (group.to_string(), container.to_string()),
            LogScript::Sequence(tails),
        );
    }

    pub async fn fail_logs(&self, group: &str, container: &str, reason: &str) {
        self.logs.write().await.insert(
            (group.to_string(), container.to_string()),
            LogScript::Fail(reason.to_string()),
        );
    }

    pub async fn set_group_status(&self, group: &str, status: GroupStatus) {
        self.statuses.write().await.insert(group.to_string(), status);
    }

    pub async fn fail_health_probe(&self, group: &str, reason: &str) {
        self.health_failures
            .write()
            .await
            .insert(group.to_string(), reason.to_string());
    }

    pub async fn fail_group(&self, group: &str, reason: &str) {
        self.create_failures
            .write()
            .await
            .insert(group.to_string(), reason.to_string());
    }

    pub async fn fail_delete(&self, group: &str, reason: &str) {
        self.delete_failures
            .write()
            .await
            .insert(group.to_string(), reason.to_string());
    }

    /// Names of groups submitted through `create_or_update`, in order.
    pub async fn submitted_groups(&self) -> Vec<String> {
        self.submitted.read().await.iter().map(|g| g.name.clone()).collect()
    }

    pub async fn submitted_specs(&self) -> Vec<ContainerGroupSpec> {
        self.submitted.read().await.clone()
    }

    pub async fn deleted_groups(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }
}

#[async_trait]
impl ComputeProvider for MockComputeProvider {
    async fn create_or_update(&self, spec: &ContainerGroupSpec) -> FleetResult<GroupHandle> {
        self.submitted.write().await.push(spec.clone());
        if let Some(reason) = self.create_failures.read().await.get(&spec.name) {
            return Err(FleetError::Provider(reason.clone()));
        }
        self.groups.write().await.insert(spec.name.clone(), spec.clone());
        Ok(GroupHandle {
            name: spec.name.clone(),
            id: Uuid::new_v4().to_string(),
        })
    }

    async fn delete(&self, group: &str) -> FleetResult<bool> {
        if let Some(reason) = self.delete_failures.read().await.get(group) {
            return Err(FleetError::Provider(reason.clone()));
        }
        self.deleted.write().await.push(group.to_string());
        Ok(self.groups.write().await.remove(group).is_some())
    }

    async fn get_logs(&self, group: &str, container: &str, _tail: u32) -> FleetResult<String> {
        let key = (group.to_string(), container.to_string());
        let scripts = self.logs.read().await;
        match scripts.get(&key) {
            None => Ok(String::new()),
            Some(LogScript::Static(tail)) => Ok(tail.clone()),
            Some(LogScript::Fail(reason)) => Err(FleetError::Provider(reason.clone())),
            Some(LogScript::Sequence(tails)) => {
                let mut cursors = self.log_cursors.write().await;
                let cursor = cursors.entry(key).or_insert(0);
                let tail = tails.get(*cursor).or_else(|| tails.last()).cloned();
                *cursor += 1;
                Ok(tail.unwrap_or_default())
            }
        }
    }

    async fn get_group(&self, group: &str) -> FleetResult<GroupStatus> {
        if let Some(reason) = self.health_failures.read().await.get(group) {
            return Err(FleetError::Provider(reason.clone()));
        }
        if let Some(status) = self.statuses.read().await.get(group) {
            return Ok(status.clone());
        }
        Ok(GroupStatus {
            name: group.to_string(),
            provisioning_state: ProvisioningState::Succeeded,
            instances: vec![],
        })
    }

    async fn list_groups(&self) -> FleetResult<Vec<GroupSummary>> {
        let groups = self.groups.read().await;
        let mut summaries: Vec<GroupSummary> = groups
            .values()
            .map(|spec| GroupSummary {
                name: spec.name.clone(),
                provisioning_state: ProvisioningState::Succeeded,
                container_names: spec.containers.iter().map(|c| c.name.clone()).collect(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}

/// Mock object store backed by a map.
#[derive(Default)]
pub struct MockObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: Option<&str>) -> FleetResult<String> {
        let key = key.map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);
        self.objects.write().await.insert(key.clone(), bytes);
        Ok(key)
    }

    async fn get(&self, key: &str) -> FleetResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| FleetError::Provider(format!("object '{key}' not found")))
    }
}

/// Mock remote shell recording every injected script.
#[derive(Default)]
pub struct MockRemoteShell {
    injected: RwLock<Vec<(String, String, String)>>,
    failures: RwLock<HashMap<String, String>>,
}

impl MockRemoteShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_container(&self, container: &str, reason: &str) {
        self.failures
            .write()
            .await
            .insert(container.to_string(), reason.to_string());
    }

    /// Recorded (group, container, script) triples.
    pub async fn injected(&self) -> Vec<(String, String, String)> {
        self.injected.read().await.clone()
    }
}

#[async_trait]
impl RemoteShell for MockRemoteShell {
    async fn inject(&self, group: &str, container: &str, script: &str) -> FleetResult<()> {
        if let Some(reason) = self.failures.read().await.get(container) {
            return Err(FleetError::Provider(reason.clone()));
        }
        self.injected.write().await.push((
            group.to_string(),
            container.to_string(),
            script.to_string(),
        ));
        Ok(())
    }
}

/// Mock credential source returning a fixed token per scope.
pub struct MockCredentialSource {
    deny_scopes: Vec<String>,
}

impl MockCredentialSource {
    pub fn new() -> Self {
        Self { deny_scopes: Vec::new() }
    }

    pub fn denying(scopes: &[&str]) -> Self {
        Self {
            deny_scopes: scopes.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for MockCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for MockCredentialSource {
    async fn acquire(&self, scope: &str) -> FleetResult<Credential> {
        if self.deny_scopes.iter().any(|s| s == scope) {
            return Err(FleetError::Auth {
                scope: scope.to_string(),
                reason: "scope denied".to_string(),
            });
        }
        Ok(Credential {
            scope: scope.to_string(),
            token: format!("mock-token-{scope}"),
            expires_at: None,
        })
    }
}
