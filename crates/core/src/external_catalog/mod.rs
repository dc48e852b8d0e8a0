//! External movie catalog (TMDB) integration.
//!
//! Candidates live in the provider's id space. Importing one asks the
//! catalog service to fetch the full record from the provider and create a
//! local movie from it.

mod tmdb;
mod types;

pub use tmdb::TmdbClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::MovieSummary;
use crate::http::HttpError;

/// Errors that can occur when interacting with the external catalog.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// Transport or service failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The candidate was already imported into the local catalog.
    #[error("Already imported: {0}")]
    Conflict(String),

    /// Unknown provider id.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Search attempted with a blank query.
    #[error("Empty search query")]
    EmptyQuery,
}

/// External catalog client.
#[async_trait]
pub trait ExternalCatalog: Send + Sync {
    /// Search the provider. An empty list is a normal outcome.
    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>, ExternalCatalogError>;

    /// Import a candidate into the local catalog and return the created movie.
    async fn import(&self, id: &ProviderId) -> Result<MovieSummary, ExternalCatalogError>;
}
