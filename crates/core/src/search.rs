//! Result fetching for the single search box and the catalog list.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{CatalogService, ListRequest, MovieSummary, ResultPage};
use crate::error::FetchError;
use crate::filter::FilterState;
use crate::query::{classify, QueryDescriptor, QueryField};

/// Outcome of a single-box search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Rows matching the classified query.
    Direct(Vec<MovieSummary>),
    /// The genre search was empty; these rows come from the title fallback.
    Related(Vec<MovieSummary>),
    NoResults,
}

impl SearchOutcome {
    pub fn items(&self) -> &[MovieSummary] {
        match self {
            SearchOutcome::Direct(items) | SearchOutcome::Related(items) => items,
            SearchOutcome::NoResults => &[],
        }
    }

    pub fn is_related(&self) -> bool {
        matches!(self, SearchOutcome::Related(_))
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// A search together with the query it was classified as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: QueryDescriptor,
    pub outcome: SearchOutcome,
}

/// Issues classified searches and list fetches against the catalog.
#[derive(Clone)]
pub struct ResultFetcher {
    catalog: Arc<dyn CatalogService>,
    page_size: u32,
}

impl std::fmt::Debug for ResultFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultFetcher")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl ResultFetcher {
    pub fn new(catalog: Arc<dyn CatalogService>, page_size: u32) -> Self {
        Self {
            catalog,
            page_size: page_size.max(1),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Classify `raw` and search for it.
    ///
    /// Blank input is a validation failure and never reaches the network.
    pub async fn search(&self, raw: &str) -> Result<SearchResults, FetchError> {
        let query = classify(raw)
            .ok_or_else(|| FetchError::Validation("Type something to search".to_string()))?;
        let outcome = self.search_descriptor(&query, raw).await?;
        Ok(SearchResults { query, outcome })
    }

    /// Search an already classified query.
    ///
    /// An empty genre search is retried once as a title search with the
    /// trimmed raw term; non-empty fallback rows are reported as related.
    pub async fn search_descriptor(
        &self,
        query: &QueryDescriptor,
        raw: &str,
    ) -> Result<SearchOutcome, FetchError> {
        debug!(field = %query.field, value = %query.value, "Searching catalog");

        let items = self.catalog.search(query).await?;
        if !items.is_empty() {
            return Ok(SearchOutcome::Direct(items));
        }

        if query.field != QueryField::Genre {
            return Ok(SearchOutcome::NoResults);
        }

        let fallback = QueryDescriptor::title(raw.trim());
        info!(term = %fallback.value, "Genre search empty, retrying as title");
        let items = self.catalog.search(&fallback).await?;

        if items.is_empty() {
            Ok(SearchOutcome::NoResults)
        } else {
            Ok(SearchOutcome::Related(items))
        }
    }

    /// Fetch one page of the filtered catalog.
    ///
    /// Pagination fields of the response are used as returned.
    pub async fn list(
        &self,
        filter: &FilterState,
        profile_id: Option<&str>,
    ) -> Result<ResultPage, FetchError> {
        let request = ListRequest {
            filter: filter.clone(),
            limit: self.page_size,
            profile_id: profile_id.map(str::to_string),
        };
        Ok(self.catalog.list(&request).await?)
    }
}
