//! Domain models.

pub mod config;
pub mod execution;
pub mod fleet;
pub mod health;
pub mod shard;

pub use config::{
    Config, LoggingConfig, ObjectStoreConfig, ProviderConfig, WatcherConfig,
};
pub use execution::{
    scan_log_tail, CommandExecution, ExecutionState, LogSignal, WatchOutcome, WatchReport,
    COMPLETION_MARKER, FAILURE_MARKER, TIMEOUT_REACHED,
};
pub use fleet::{
    chunk_indices, container_name, group_name, ContainerGroupSpec, ContainerSpec, Fleet,
    ResourceBudget, ResourceShare, MAX_GROUP_SIZE,
};
pub use health::{GroupEvent, GroupStatus, GroupSummary, InstanceView, ProvisioningState};
pub use shard::{split_targets, ShardRef};
