//! Identity provider backed by the catalog service's `/auth` endpoints.

use async_trait::async_trait;
use tracing::debug;

use super::types::{Credentials, LoginResponse, Registration};
use super::{AuthError, IdentityProvider};
use crate::http::{read_json, ApiClient};

#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    api: ApiClient,
}

impl HttpIdentityProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        debug!(email = %credentials.email, "Logging in");
        let response = self.api.post_json("auth/login", credentials).await?;
        let body: LoginResponse = read_json(response)
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
        if body.token.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty token".to_string()));
        }
        Ok(body.token)
    }

    async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        debug!(email = %registration.email, "Registering");
        self.api.post_json("auth/register", registration).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}
