use async_trait::async_trait;
use thiserror::Error;

use super::types::{Credentials, Registration};
use crate::http::HttpError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Form input rejected before any request.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        match err.status() {
            Some(status) if (400..500).contains(&status) => {
                AuthError::InvalidCredentials(err.user_message())
            }
            _ => AuthError::ServiceUnavailable(err.user_message()),
        }
    }
}

/// Remote identity operations. Token handling stays with the caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError>;

    /// Create an account. Does not log in.
    async fn register(&self, registration: &Registration) -> Result<(), AuthError>;

    /// Name of this provider
    fn provider_name(&self) -> &'static str;
}
