//! REST object-store adapter.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::rest::models::KeyDto;
use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::ports::{CredentialSource, ObjectStore};

/// HTTP client for the blob/object-store API.
pub struct RestObjectStore {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    scope: String,
}

impl RestObjectStore {
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

    async fn bearer(&self) -> FleetResult<String> {
        Ok(self.credentials.acquire(&self.scope).await?.token)
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: Option<&str>) -> FleetResult<String> {
        let token = self.bearer().await?;
        let response = match key {
            // Caller-chosen key: idempotent PUT.
            Some(key) => {
                self.http
                    .put(format!("{}/objects/{key}", self.base_url))
                    .bearer_auth(&token)
                    .body(bytes)
                    .send()
                    .await?
            }
            // Store-minted key: POST to the collection.
            None => {
                self.http
                    .post(format!("{}/objects", self.base_url))
                    .bearer_auth(&token)
                    .body(bytes)
                    .send()
                    .await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FleetError::Provider(format!("object put {status}: {body}")));
        }
        let minted: KeyDto = response.json().await?;
        Ok(minted.key)
    }

    async fn get(&self, key: &str) -> FleetResult<Vec<u8>> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(format!("{}/objects/{key}", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FleetError::Provider(format!("object get {status}: {body}")));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
