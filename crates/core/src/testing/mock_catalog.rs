//! Mock catalog service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{
    CatalogError, CatalogService, ListRequest, MoviePayload, MovieSummary, ResultPage,
};
use crate::query::{normalize, QueryDescriptor, QueryField};

/// A recorded catalog call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogCall {
    List(ListRequest),
    Search(QueryDescriptor),
    Get { id: String },
    Create { title: String },
    Update { id: String },
    Remove { id: String },
}

/// Mock implementation of the CatalogService trait.
///
/// Provides controllable behavior for testing:
/// - In-memory movies with title/genre/year filtering and pagination
/// - Track calls for assertions
/// - Simulate failures and slow list responses per genre
///
/// # Example
///
/// ```rust,ignore
/// use filmoteca_core::testing::{MockCatalog, fixtures};
///
/// let catalog = MockCatalog::new();
/// catalog.add_movie(fixtures::movie("m1", "Alien", 1979, &["terror"])).await;
///
/// let page = catalog.list(&request).await?;
/// assert_eq!(page.total_docs, 1);
/// ```
#[derive(Debug)]
pub struct MockCatalog {
    /// Movies in insertion order.
    movies: Arc<RwLock<Vec<MovieSummary>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCatalogCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// Artificial latency of `list` keyed by the requested genre.
    list_delays: Arc<RwLock<HashMap<String, Duration>>>,
    next_id: AtomicU64,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            movies: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            list_delays: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a movie.
    pub async fn add_movie(&self, movie: MovieSummary) {
        self.movies.write().await.push(movie);
    }

    /// Replace all movies at once.
    pub async fn set_movies(&self, movies: Vec<MovieSummary>) {
        *self.movies.write().await = movies;
    }

    pub async fn movies(&self) -> Vec<MovieSummary> {
        self.movies.read().await.clone()
    }

    /// Delay `list` responses for requests filtered by `genre`.
    pub async fn set_list_delay(&self, genre: &str, delay: Duration) {
        self.list_delays
            .write()
            .await
            .insert(genre.to_string(), delay);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCatalogCall> {
        self.calls.read().await.clone()
    }

    /// Recorded `list` requests only.
    pub async fn list_requests(&self) -> Vec<ListRequest> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCatalogCall::List(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded `search` queries only.
    pub async fn search_queries(&self) -> Vec<QueryDescriptor> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedCatalogCall::Search(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedCatalogCall) {
        self.calls.write().await.push(call);
    }

    fn matches(movie: &MovieSummary, field: QueryField, value: &str) -> bool {
        match field {
            QueryField::Title => normalize(&movie.title).contains(&normalize(value)),
            QueryField::Genre => movie
                .genres
                .iter()
                .any(|g| normalize(g) == normalize(value)),
            QueryField::Year => movie.year.map(|y| y.to_string()).as_deref() == Some(value),
        }
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn list(&self, request: &ListRequest) -> Result<ResultPage, CatalogError> {
        self.record(RecordedCatalogCall::List(request.clone())).await;

        let delay = self
            .list_delays
            .read()
            .await
            .get(&request.filter.genre)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let filter = &request.filter;
        let matching: Vec<MovieSummary> = self
            .movies
            .read()
            .await
            .iter()
            .filter(|m| filter.search.is_empty() || Self::matches(m, QueryField::Title, &filter.search))
            .filter(|m| filter.genre.is_empty() || Self::matches(m, QueryField::Genre, &filter.genre))
            .filter(|m| filter.year.is_empty() || Self::matches(m, QueryField::Year, &filter.year))
            .cloned()
            .collect();

        let limit = request.limit.max(1) as usize;
        let total_docs = matching.len() as u64;
        let total_pages = matching.len().div_ceil(limit).max(1) as u32;
        let page = filter.page.max(1);
        let items = matching
            .into_iter()
            .skip((page as usize - 1) * limit)
            .take(limit)
            .collect();

        Ok(ResultPage {
            items,
            page,
            total_pages,
            total_docs,
        })
    }

    async fn search(&self, query: &QueryDescriptor) -> Result<Vec<MovieSummary>, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogCall::Search(query.clone())).await;

        Ok(self
            .movies
            .read()
            .await
            .iter()
            .filter(|m| Self::matches(m, query.field, &query.value))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<MovieSummary, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogCall::Get { id: id.to_string() })
            .await;

        self.movies
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn create(&self, payload: &MoviePayload) -> Result<MovieSummary, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogCall::Create {
            title: payload.title.clone(),
        })
        .await;

        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let movie = movie_from_payload(id, payload);
        self.movies.write().await.push(movie.clone());
        Ok(movie)
    }

    async fn update(
        &self,
        id: &str,
        payload: &MoviePayload,
    ) -> Result<MovieSummary, CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogCall::Update { id: id.to_string() })
            .await;

        let mut movies = self.movies.write().await;
        let slot = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        *slot = movie_from_payload(id.to_string(), payload);
        Ok(slot.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.record(RecordedCatalogCall::Remove { id: id.to_string() })
            .await;

        let mut movies = self.movies.write().await;
        let before = movies.len();
        movies.retain(|m| m.id != id);
        if movies.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn movie_from_payload(id: String, payload: &MoviePayload) -> MovieSummary {
    MovieSummary {
        id,
        title: payload.title.clone(),
        year: payload.year,
        genres: payload.genres.clone(),
        age_rating: payload.age_rating.clone(),
        overview: payload.overview.clone(),
        poster: payload.poster.clone(),
        director: payload.director.clone(),
        rating: payload.rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterState;
    use crate::testing::fixtures;

    fn request(filter: FilterState, limit: u32) -> ListRequest {
        ListRequest {
            filter,
            limit,
            profile_id: None,
        }
    }

    #[tokio::test]
    async fn test_list_paginates_and_filters() {
        let catalog = MockCatalog::new();
        catalog.set_movies(fixtures::movies(30)).await;

        let page = catalog
            .list(&request(
                FilterState {
                    page: 2,
                    ..Default::default()
                },
                12,
            ))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_docs, 30);

        let page = catalog
            .list(&request(
                FilterState {
                    genre: "bélico".to_string(),
                    ..Default::default()
                },
                12,
            ))
            .await
            .unwrap();
        assert!(page.items.iter().all(|m| m.genres.contains(&"bélico".to_string())));
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed_once() {
        let catalog = MockCatalog::new();
        catalog
            .set_next_error(CatalogError::Invalid("boom".to_string()))
            .await;

        assert!(catalog.get("x").await.is_err());
        assert!(matches!(
            catalog.get("x").await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_update_remove() {
        let catalog = MockCatalog::new();
        let created = catalog
            .create(&MoviePayload {
                title: "Alien".to_string(),
                year: Some(1979),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = catalog
            .update(
                &created.id,
                &MoviePayload {
                    title: "Aliens".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Aliens");

        catalog.remove(&created.id).await.unwrap();
        assert!(matches!(
            catalog.remove(&created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
