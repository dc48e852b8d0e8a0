//! Local catalog service.
//!
//! The catalog is an external REST service; this module holds its types,
//! the [`CatalogService`] trait the rest of the crate programs against, and
//! the HTTP implementation.

mod http;
mod types;

pub use http::HttpCatalog;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::HttpError;
use crate::query::QueryDescriptor;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport or service failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The requested movie does not exist.
    #[error("Movie not found: {0}")]
    NotFound(String),

    /// Payload rejected locally before sending.
    #[error("Invalid movie: {0}")]
    Invalid(String),
}

/// Operations offered by the catalog service.
///
/// "No matches" is an empty list or page, never an error.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch one page of the filtered catalog.
    async fn list(&self, request: &ListRequest) -> Result<ResultPage, CatalogError>;

    /// Search by a single classified field.
    async fn search(&self, query: &QueryDescriptor) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Get one movie by id.
    async fn get(&self, id: &str) -> Result<MovieSummary, CatalogError>;

    async fn create(&self, payload: &MoviePayload) -> Result<MovieSummary, CatalogError>;

    async fn update(&self, id: &str, payload: &MoviePayload)
        -> Result<MovieSummary, CatalogError>;

    async fn remove(&self, id: &str) -> Result<(), CatalogError>;
}
