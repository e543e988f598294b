//! REST remote-shell adapter.
//!
//! Hands an injection script to the provider's exec endpoint for an
//! already-running container. The call returns once the script has been
//! accepted; command outcome is observed through the log stream only.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::rest::models::ExecRequestDto;
use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::ports::{CredentialSource, RemoteShell};

pub struct RestRemoteShell {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    scope: String,
}

impl RestRemoteShell {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl RemoteShell for RestRemoteShell {
    async fn inject(&self, group: &str, container: &str, script: &str) -> FleetResult<()> {
        let token = self.credentials.acquire(&self.scope).await?.token;
        let url = format!(
            "{}/groups/{group}/containers/{container}/exec",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&ExecRequestDto { script })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FleetError::Provider(format!("exec {status}: {body}")));
        }
        Ok(())
    }
}
