//! Mock external catalog for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::MovieSummary;
use crate::external_catalog::{
    ExternalCandidate, ExternalCatalog, ExternalCatalogError, ProviderId,
};
use crate::query::normalize;

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Search { query: String },
    Import { id: ProviderId },
}

/// Mock implementation of the ExternalCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates
/// - Reject a second import of the same id as a conflict
/// - Track queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use filmoteca_core::testing::{MockExternalCatalog, fixtures};
///
/// let catalog = MockExternalCatalog::new();
/// catalog.add_candidate(fixtures::candidate("603", "The Matrix", 1999)).await;
///
/// let results = catalog.search("matrix").await?;
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockExternalCatalog {
    /// Candidates by provider id.
    candidates: Arc<RwLock<HashMap<ProviderId, ExternalCandidate>>>,
    /// Ids already imported.
    imported: Arc<RwLock<HashSet<ProviderId>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockExternalCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExternalCatalog {
    /// Create a new empty mock external catalog.
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(RwLock::new(HashMap::new())),
            imported: Arc::new(RwLock::new(HashSet::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a candidate. Candidates without a provider id are ignored.
    pub async fn add_candidate(&self, candidate: ExternalCandidate) {
        if let Some(id) = candidate.provider_id.clone() {
            self.candidates.write().await.insert(id, candidate);
        }
    }

    /// Mark an id as already present in the local catalog.
    pub async fn mark_imported(&self, id: &str) {
        self.imported.write().await.insert(ProviderId::new(id));
    }

    pub async fn imported_count(&self) -> usize {
        self.imported.read().await.len()
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Search terms only, in call order.
    pub async fn search_queries(&self) -> Vec<String> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Search { query } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded queries.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ExternalCatalogError> {
        self.next_error.write().await.take()
    }

    /// Record a query.
    async fn record(&self, query: RecordedCatalogQuery) {
        self.queries.write().await.push(query);
    }
}

#[async_trait]
impl ExternalCatalog for MockExternalCatalog {
    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>, ExternalCatalogError> {
        if query.trim().is_empty() {
            return Err(ExternalCatalogError::EmptyQuery);
        }

        self.record(RecordedCatalogQuery::Search {
            query: query.to_string(),
        })
        .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let needle = normalize(query);
        let mut results: Vec<ExternalCandidate> = self
            .candidates
            .read()
            .await
            .values()
            .filter(|c| normalize(&c.title).contains(&needle))
            .cloned()
            .collect();
        results.sort_by(|a, b| a.title.cmp(&b.title));

        Ok(results)
    }

    async fn import(&self, id: &ProviderId) -> Result<MovieSummary, ExternalCatalogError> {
        self.record(RecordedCatalogQuery::Import { id: id.clone() })
            .await;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let candidate = self
            .candidates
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ExternalCatalogError::NotFound(format!("TMDB ID {}", id)))?;

        if !self.imported.write().await.insert(id.clone()) {
            return Err(ExternalCatalogError::Conflict(format!(
                "{} is already in the catalog",
                candidate.display_title()
            )));
        }

        Ok(MovieSummary {
            id: format!("tmdb-{}", id),
            title: candidate.title,
            year: candidate.year,
            genres: Vec::new(),
            age_rating: candidate.age_rating,
            overview: None,
            poster: candidate.poster,
            director: None,
            rating: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_search_matches_title() {
        let catalog = MockExternalCatalog::new();
        catalog
            .add_candidate(fixtures::candidate("603", "The Matrix", 1999))
            .await;
        catalog
            .add_candidate(fixtures::candidate("604", "The Matrix Reloaded", 2003))
            .await;
        catalog
            .add_candidate(fixtures::candidate("78", "Blade Runner", 1982))
            .await;

        let results = catalog.search("matrix").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "The Matrix");
    }

    #[tokio::test]
    async fn test_second_import_conflicts() {
        let catalog = MockExternalCatalog::new();
        catalog
            .add_candidate(fixtures::candidate("603", "The Matrix", 1999))
            .await;
        let id = ProviderId::new("603");

        let movie = catalog.import(&id).await.unwrap();
        assert_eq!(movie.id, "tmdb-603");
        assert!(matches!(
            catalog.import(&id).await,
            Err(ExternalCatalogError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_import_and_error_injection() {
        let catalog = MockExternalCatalog::new();
        assert!(matches!(
            catalog.import(&ProviderId::new("1")).await,
            Err(ExternalCatalogError::NotFound(_))
        ));

        catalog
            .set_next_error(ExternalCatalogError::NotFound("x".to_string()))
            .await;
        assert!(catalog.search("anything").await.is_err());
        assert!(catalog.search("anything").await.unwrap().is_empty());
        assert_eq!(catalog.recorded_queries().await.len(), 3);
    }
}
