//! User-facing failure taxonomy.
//!
//! "No results" is deliberately absent: an empty result is a normal outcome
//! and is modelled by the result types themselves.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::external_catalog::ExternalCatalogError;
use crate::http::HttpError;
use crate::session::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// Service unreachable or answering with a server error. Retryable.
    #[error("Service unavailable: {0}")]
    Transport(String),

    /// The external candidate already exists in the local catalog.
    #[error("Already in the catalog: {0}")]
    ImportConflict(String),

    /// A specific resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the service (bad credentials, missing rights, bad payload).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The local session file could not be read or written.
    #[error("{0}")]
    Session(String),
}

impl FetchError {
    /// Whether retrying the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        let message = err.user_message();
        match err.status() {
            Some(404) => FetchError::NotFound(message),
            Some(409) => FetchError::ImportConflict(message),
            Some(status) if (400..500).contains(&status) => FetchError::Rejected(message),
            _ => FetchError::Transport(message),
        }
    }
}

impl From<CatalogError> for FetchError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Http(e) => e.into(),
            CatalogError::NotFound(id) => FetchError::NotFound(format!("movie {}", id)),
            CatalogError::Invalid(msg) => FetchError::Validation(msg),
        }
    }
}

impl From<ExternalCatalogError> for FetchError {
    fn from(err: ExternalCatalogError) -> Self {
        match err {
            ExternalCatalogError::Conflict(msg) => FetchError::ImportConflict(msg),
            ExternalCatalogError::NotFound(msg) => FetchError::NotFound(msg),
            ExternalCatalogError::EmptyQuery => {
                FetchError::Validation("Type something to search".to_string())
            }
            ExternalCatalogError::Http(e) => e.into(),
        }
    }
}

impl From<SessionError> for FetchError {
    fn from(err: SessionError) -> Self {
        FetchError::Session(err.to_string())
    }
}
