//! Fleet, container-group, and container models.
//!
//! A fleet is a named provisioning request that owns one or more container
//! groups. Groups are bounded at [`MAX_GROUP_SIZE`] members because the
//! compute provider enforces a per-group ceiling; chunking and per-instance
//! resource division happen here so the provisioner stays a thin submission
//! loop.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::shard::ShardRef;

/// Maximum number of containers a single group may hold.
pub const MAX_GROUP_SIZE: usize = 10;

/// Total CPU/memory ceiling for one fleet, divided across instances at
/// provisioning time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceBudget {
    /// Total CPU cores available to the fleet.
    pub cpu: f64,

    /// Total memory in GB available to the fleet.
    pub memory_gb: f64,
}

impl ResourceBudget {
    pub const fn new(cpu: f64, memory_gb: f64) -> Self {
        Self { cpu, memory_gb }
    }

    /// Compute the per-instance share for `instance_count` instances.
    ///
    /// The divisor is `instance_count + 1`: one unit of headroom is always
    /// reserved, so running instances never receive the full budget. Values
    /// are rounded to one decimal place, matching provider quota granularity.
    pub fn share_for(&self, instance_count: usize) -> ResourceShare {
        ResourceShare {
            cpu: round1(self.cpu / (instance_count as f64 + 1.0)),
            memory_gb: round1(self.memory_gb / (instance_count as f64 + 1.0)),
        }
    }
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self { cpu: 16.0, memory_gb: 16.0 }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The resource slice allocated to a single container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceShare {
    pub cpu: f64,
    pub memory_gb: f64,
}

/// One container within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container name, `{fleet}-{index:02}`.
    pub name: String,

    /// Image reference.
    pub image: String,

    /// Computed resource share.
    pub resources: ResourceShare,

    /// Entrypoint command. Empty when the image's own entrypoint runs.
    pub command: Vec<String>,

    /// Environment passed to the container. Shard references travel here,
    /// never inside the command string.
    pub environment: HashMap<String, String>,

    /// The input shard assigned to this container, if any.
    pub shard: Option<ShardRef>,
}

impl ContainerSpec {
    pub fn new(fleet: &str, index: usize, image: &str, resources: ResourceShare) -> Self {
        Self {
            name: container_name(fleet, index),
            image: image.to_string(),
            resources,
            command: Vec::new(),
            environment: HashMap::new(),
            shard: None,
        }
    }

    /// Attach an input shard by reference via the environment.
    pub fn assign_shard(&mut self, shard: ShardRef) {
        self.environment
            .insert("FLOTILLA_SHARD_REF".to_string(), shard.key.clone());
        self.shard = Some(shard);
    }
}

/// Canonical container naming: `{fleet}-{index:02}`, 1-based index.
pub fn container_name(fleet: &str, index: usize) -> String {
    format!("{fleet}-{index:02}")
}

/// Canonical group naming: `{fleet}-{group_index:02}`, 1-based index.
pub fn group_name(fleet: &str, group_index: usize) -> String {
    format!("{fleet}-{group_index:02}")
}

/// A chunk of at most [`MAX_GROUP_SIZE`] containers sharing one
/// lifecycle/network identity. Owned exclusively by the fleet that
/// created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerGroupSpec {
    /// Group name, `{fleet}-{group_index:02}`.
    pub name: String,

    /// Owning fleet.
    pub fleet: String,

    /// Provider region for the group.
    pub region: String,

    /// Members, between 1 and [`MAX_GROUP_SIZE`].
    pub containers: Vec<ContainerSpec>,
}

/// A named logical unit representing one provisioning request.
///
/// Fleets are not destroyed automatically; removal happens only through an
/// explicit `rm` or external garbage collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub name: String,
    pub image: String,
    pub instance_count: usize,
    pub budget: ResourceBudget,
    pub created_at: DateTime<Utc>,
}

impl Fleet {
    pub fn new(name: &str, image: &str, instance_count: usize, budget: ResourceBudget) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            instance_count,
            budget,
            created_at: Utc::now(),
        }
    }
}

/// Partition `1..=instance_count` into contiguous blocks of at most
/// [`MAX_GROUP_SIZE`] indices.
///
/// Produces `ceil(instance_count / MAX_GROUP_SIZE)` blocks whose sizes sum
/// to `instance_count`, each in `[1, MAX_GROUP_SIZE]`.
pub fn chunk_indices(instance_count: usize) -> Vec<Vec<usize>> {
    (1..=instance_count)
        .collect::<Vec<_>>()
        .chunks(MAX_GROUP_SIZE)
        .map(<[usize]>::to_vec)
        .collect()
}
