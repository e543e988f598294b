//! Input-target sharding.
//!
//! A shard is a contiguous slice of an input target list, staged as a
//! retrievable object and consumed by exactly one container.

use serde::{Deserialize, Serialize};

/// Reference to a staged shard: the opaque object-store key plus the line
/// count, which is kept for reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardRef {
    /// Opaque object-store key.
    pub key: String,

    /// Number of target lines in the shard.
    pub lines: usize,
}

impl ShardRef {
    pub fn new(key: impl Into<String>, lines: usize) -> Self {
        Self { key: key.into(), lines }
    }
}

/// Split `targets` into `shard_count` contiguous slices.
///
/// Each shard receives `len / shard_count` lines; any remainder lines are
/// appended to the last shard, so line counts always sum to `targets.len()`.
/// Requesting more shards than targets yields one shard per target.
pub fn split_targets(targets: &[String], shard_count: usize) -> Vec<Vec<String>> {
    if targets.is_empty() || shard_count == 0 {
        return Vec::new();
    }
    let shard_count = shard_count.min(targets.len());
    let base = targets.len() / shard_count;

    let mut shards: Vec<Vec<String>> = Vec::with_capacity(shard_count);
    let mut cursor = 0;
    for _ in 0..shard_count {
        shards.push(targets[cursor..cursor + base].to_vec());
        cursor += base;
    }
    // Remainder lines belong to the last shard.
    if cursor < targets.len() {
        if let Some(last) = shards.last_mut() {
            last.extend_from_slice(&targets[cursor..]);
        }
    }
    shards
}
