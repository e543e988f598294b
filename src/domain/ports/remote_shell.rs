//! Remote shell port - session injection into running containers.

use async_trait::async_trait;

use crate::domain::errors::FleetResult;

/// Trait for injecting a script into an already-running container through
/// a remote session.
///
/// `inject` returns as soon as the script has been handed to the remote
/// shell; the script itself is expected to background any long-running
/// work. There is no synchronous acknowledgment of the command's outcome.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn inject(&self, group: &str, container: &str, script: &str) -> FleetResult<()>;
}
