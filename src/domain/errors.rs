//! Domain errors for the Flotilla fleet system.

use thiserror::Error;

/// Format the list of missing request fields for display.
fn format_missing(fields: &[String]) -> String {
    fields.join(", ")
}

/// Domain-level errors that can occur while provisioning or watching fleets.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Malformed or missing input. Surfaced before any resource is touched.
    #[error("Validation failed, missing fields: {}", format_missing(.0))]
    Validation(Vec<String>),

    /// Compute or storage API failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Credential acquisition failure.
    #[error("Authentication failed for scope '{scope}': {reason}")]
    Auth { scope: String, reason: String },

    /// A watcher exceeded its caller-supplied wait budget.
    #[error("Wait budget of {budget_secs}s exceeded for container '{container}'")]
    Timeout { container: String, budget_secs: u64 },

    /// Failure marker observed in logs, or provider-reported failed health state.
    #[error("Remote failure on '{container}': {reason}")]
    RemoteFailure { container: String, reason: String },

    /// Success marker present but token extraction failed.
    #[error("Completion marker present but token could not be parsed: {0}")]
    Parse(String),

    /// Input shard staging or retrieval failed.
    #[error("Shard error: {0}")]
    Shard(String),
}

pub type FleetResult<T> = Result<T, FleetError>;

impl FleetError {
    /// Stable machine-readable kind, used by the structured error response.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Provider(_) => "ProviderError",
            Self::Auth { .. } => "AuthError",
            Self::Timeout { .. } => "TimeoutError",
            Self::RemoteFailure { .. } => "RemoteFailure",
            Self::Parse(_) => "ParseError",
            Self::Shard(_) => "ShardError",
        }
    }
}

impl From<reqwest::Error> for FleetError {
    fn from(err: reqwest::Error) -> Self {
        FleetError::Provider(err.to_string())
    }
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::Provider(format!("response decode: {err}"))
    }
}
