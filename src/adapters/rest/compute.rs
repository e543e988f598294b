//! REST compute provider.
//!
//! Wraps the provider's container-group API with typed methods, a
//! token-bucket rate limiter, and transient-error retry on idempotent
//! reads. Group creation is never retried: the create call blocks until
//! the provider reports completion, and a blind re-submit could
//! double-provision.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::adapters::rest::models::{
    CreateResponseDto, GroupListDto, GroupSpecDto, GroupStatusDto,
};
use crate::adapters::rest::retry::{RestError, RetryPolicy};
use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::models::{ContainerGroupSpec, GroupStatus, GroupSummary};
use crate::domain::ports::{ComputeProvider, CredentialSource, GroupHandle};

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`; when exhausted,
/// [`acquire`](RateLimiter::acquire) sleeps until the window resets.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Acquire a single token, sleeping if necessary.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "Compute API rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// HTTP client for the compute provider's group API.
pub struct RestComputeProvider {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    scope: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    retry: RetryPolicy,
}

impl RestComputeProvider {
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
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                100,
                Duration::from_secs(60),
            ))),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (used to shrink backoff in tests).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn bearer(&self) -> FleetResult<String> {
        let credential = self.credentials.acquire(&self.scope).await?;
        Ok(credential.token)
    }

    async fn throttled(&self) {
        self.rate_limiter.lock().await.acquire().await;
    }

    /// GET `path` and decode a JSON body, with transient-error retry.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> FleetResult<T> {
        let token = self.bearer().await?;
        let url = format!("{}{path}", self.base_url);
        self.retry
            .execute(|| {
                let http = self.http.clone();
                let url = url.clone();
                let token = token.clone();
                async move {
                    let response = http.get(&url).bearer_auth(&token).send().await?;
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(RestError::from_status(status, &body));
                    }
                    response
                        .json::<T>()
                        .await
                        .map_err(|e| RestError::Fatal(format!("decode: {e}")))
                }
            })
            .await
    }
}

#[async_trait]
impl ComputeProvider for RestComputeProvider {
    async fn create_or_update(&self, spec: &ContainerGroupSpec) -> FleetResult<GroupHandle> {
        self.throttled().await;
        let token = self.bearer().await?;
        let url = format!("{}/groups/{}", self.base_url, spec.name);
        let dto = GroupSpecDto::from(spec);

        let response = self
            .http
            .put(&url)
            .bearer_auth(&token)
            .json(&dto)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FleetError::Provider(format!(
                "group creation {status}: {body}"
            )));
        }
        let created: CreateResponseDto = response.json().await?;
        Ok(GroupHandle { name: spec.name.clone(), id: created.id })
    }

    async fn delete(&self, group: &str) -> FleetResult<bool> {
        self.throttled().await;
        let token = self.bearer().await?;
        let url = format!("{}/groups/{group}", self.base_url);

        let response = self.http.delete(&url).bearer_auth(&token).send().await?;
        let status = response.status();
        // Already absent is success, not an error.
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FleetError::Provider(format!("delete {status}: {body}")));
        }
        Ok(true)
    }

    async fn get_logs(&self, group: &str, container: &str, tail: u32) -> FleetResult<String> {
        self.throttled().await;
        let token = self.bearer().await?;
        let url = format!(
            "{}/groups/{group}/containers/{container}/logs?tail={tail}",
            self.base_url
        );
        self.retry
            .execute(|| {
                let http = self.http.clone();
                let url = url.clone();
                let token = token.clone();
                async move {
                    let response = http.get(&url).bearer_auth(&token).send().await?;
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(RestError::from_status(status, &body));
                    }
                    response
                        .text()
                        .await
                        .map_err(|e| RestError::Fatal(format!("read body: {e}")))
                }
            })
            .await
    }

    async fn get_group(&self, group: &str) -> FleetResult<GroupStatus> {
        self.throttled().await;
        let dto: GroupStatusDto = self.get_json(&format!("/groups/{group}")).await?;
        Ok(dto.into())
    }

    async fn list_groups(&self) -> FleetResult<Vec<GroupSummary>> {
        self.throttled().await;
        let dto: GroupListDto = self.get_json("/groups").await?;
        Ok(dto.groups.into_iter().map(Into::into).collect())
    }
}
