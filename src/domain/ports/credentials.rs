//! Credential source port.
//!
//! Credential security is delegated entirely to the host identity
//! provider; this port only models acquisition of scoped credentials.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::FleetResult;

/// A scoped credential handed to the compute and storage adapters.
#[derive(Debug, Clone)]
pub struct Credential {
    pub scope: String,
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Trait for credential acquisition.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Acquire a credential for `scope`, or fail with an `Auth` error.
    async fn acquire(&self, scope: &str) -> FleetResult<Credential>;
}
