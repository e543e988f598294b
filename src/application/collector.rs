//! Output collector.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::FleetResult;
use crate::domain::ports::ObjectStore;

/// Resolves a completion token into the stored result payload.
///
/// The collector never deletes or expires stored objects; result
/// lifecycle is governed by the store's retention policy.
pub struct OutputCollector {
    store: Arc<dyn ObjectStore>,
}

impl OutputCollector {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch the raw payload stored under `token`.
    pub async fn collect(&self, token: &str) -> FleetResult<Vec<u8>> {
        let payload = self.store.get(token).await?;
        debug!(token = %token, bytes = payload.len(), "Collected result payload");
        Ok(payload)
    }
}
