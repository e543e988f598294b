//! Object store port - staging input shards and fetching result payloads.

use async_trait::async_trait;

use crate::domain::errors::FleetResult;

/// Trait for blob/object-store implementations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes`, optionally under a caller-chosen key. Returns the key
    /// the object was stored under.
    async fn put(&self, bytes: Vec<u8>, key: Option<&str>) -> FleetResult<String>;

    /// Fetch the raw content stored under `key`.
    async fn get(&self, key: &str) -> FleetResult<Vec<u8>>;
}
