//! Input distributor.
//!
//! Splits a target list into per-instance shards and stages each shard in
//! the object store so containers can retrieve their slice by reference.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::models::{split_targets, ShardRef};
use crate::domain::ports::ObjectStore;

/// Stages input shards for retrieval by fleet containers.
pub struct InputDistributor {
    store: Arc<dyn ObjectStore>,
}

impl InputDistributor {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Split `targets` into `shard_count` contiguous slices and stage each
    /// one. Returns the shard references in creation order; the queue is
    /// consumed front-to-back by the provisioner, one shard per container.
    #[instrument(skip(self, targets), fields(target_count = targets.len()))]
    pub async fn stage(
        &self,
        targets: &[String],
        shard_count: usize,
    ) -> FleetResult<VecDeque<ShardRef>> {
        let mut refs = VecDeque::new();
        for slice in split_targets(targets, shard_count) {
            let key = format!("shard-{}", Uuid::new_v4());
            let body = slice.join("\n");
            let stored_key = self.store.put(body.into_bytes(), Some(&key)).await?;
            debug!(key = %stored_key, lines = slice.len(), "Staged input shard");
            refs.push_back(ShardRef::new(stored_key, slice.len()));
        }
        Ok(refs)
    }

    /// Read a newline-delimited target file and stage it as `shard_count`
    /// shards. Blank lines are dropped.
    pub async fn stage_file(
        &self,
        path: &Path,
        shard_count: usize,
    ) -> FleetResult<VecDeque<ShardRef>> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FleetError::Shard(format!("cannot read {}: {e}", path.display())))?;
        let targets: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect();
        self.stage(&targets, shard_count).await
    }
}
