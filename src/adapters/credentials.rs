//! Environment-backed credential source.
//!
//! Reads `FLOTILLA_TOKEN_<SCOPE>` (scope upper-cased), falling back to
//! `FLOTILLA_API_TOKEN`. Real token issuance, rotation, and scoping are
//! the host identity provider's problem.

use async_trait::async_trait;

use crate::domain::errors::{FleetError, FleetResult};
use crate::domain::ports::{Credential, CredentialSource};

pub struct EnvCredentialSource;

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    async fn acquire(&self, scope: &str) -> FleetResult<Credential> {
        let scoped_var = format!("FLOTILLA_TOKEN_{}", scope.to_uppercase());
        let token = std::env::var(&scoped_var)
            .or_else(|_| std::env::var("FLOTILLA_API_TOKEN"))
            .map_err(|_| FleetError::Auth {
                scope: scope.to_string(),
                reason: format!("neither {scoped_var} nor FLOTILLA_API_TOKEN is set"),
            })?;
        if token.is_empty() {
            return Err(FleetError::Auth {
                scope: scope.to_string(),
                reason: "credential token is empty".to_string(),
            });
        }
        Ok(Credential {
            scope: scope.to_string(),
            token,
            expires_at: None,
        })
    }
}
