//! External catalog fallback.
//!
//! When a free-text catalog search comes back empty the user is offered a
//! search against the external provider, with one-click import of its
//! results. [`ImportPanel`] is the state machine behind that offer:
//!
//! ```text
//! Closed -> Ready -> Searching -> Results | NoResults | Error
//! Results -> Importing -> Results
//! any -> Closed
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{MovieSummary, ResultPage};
use crate::error::FetchError;
use crate::external_catalog::{ExternalCandidate, ExternalCatalog, ProviderId};
use crate::filter::FilterState;

/// Whether the external search should be offered for this fetch.
///
/// Only a non-blank free-text term with an empty local page qualifies;
/// genre-only or year-only filtering never does.
pub fn should_offer_external(filter: &FilterState, page: &ResultPage) -> bool {
    filter.search_term().is_some() && page.is_empty()
}

/// State of the import panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Closed,
    /// Open with a query, nothing searched yet.
    Ready { query: String },
    Searching { query: String },
    Results {
        query: String,
        candidates: Vec<ExternalCandidate>,
    },
    NoResults { query: String },
    Error { query: String, error: FetchError },
    /// Importing one candidate; the result list stays as it was.
    Importing {
        query: String,
        candidates: Vec<ExternalCandidate>,
        provider_id: ProviderId,
    },
}

impl PanelState {
    /// Query the panel is showing, if open.
    pub fn query(&self) -> Option<&str> {
        match self {
            PanelState::Closed => None,
            PanelState::Ready { query }
            | PanelState::Searching { query }
            | PanelState::Results { query, .. }
            | PanelState::NoResults { query }
            | PanelState::Error { query, .. }
            | PanelState::Importing { query, .. } => Some(query),
        }
    }

    pub fn candidates(&self) -> &[ExternalCandidate] {
        match self {
            PanelState::Results { candidates, .. } | PanelState::Importing { candidates, .. } => {
                candidates
            }
            _ => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PanelState::Closed => "closed",
            PanelState::Ready { .. } => "ready",
            PanelState::Searching { .. } => "searching",
            PanelState::Results { .. } => "results",
            PanelState::NoResults { .. } => "no_results",
            PanelState::Error { .. } => "error",
            PanelState::Importing { .. } => "importing",
        }
    }
}

/// Import panel over an external catalog.
pub struct ImportPanel {
    external: Arc<dyn ExternalCatalog>,
    state: PanelState,
    /// Armed by [`ImportPanel::offer`], consumed by the first auto-search.
    auto_search: bool,
    last_error: Option<FetchError>,
}

impl std::fmt::Debug for ImportPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPanel")
            .field("state", &self.state)
            .field("auto_search", &self.auto_search)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl ImportPanel {
    pub fn new(external: Arc<dyn ExternalCatalog>) -> Self {
        Self {
            external,
            state: PanelState::Closed,
            auto_search: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PanelState::Closed
    }

    /// Error of the last failed search or import, cleared on close.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn auto_search_armed(&self) -> bool {
        self.auto_search
    }

    /// Open the panel seeded with `term` and arm the auto-search.
    ///
    /// Ignored while the panel is already open. Returns whether it opened.
    pub fn offer(&mut self, term: &str) -> bool {
        let query = term.trim();
        if self.is_open() || query.is_empty() {
            return false;
        }
        info!(query = %query, "Offering external search");
        self.state = PanelState::Ready {
            query: query.to_string(),
        };
        self.auto_search = true;
        true
    }

    /// Open the panel without arming the auto-search.
    pub fn open(&mut self, query: &str) {
        if !self.is_open() {
            self.state = PanelState::Ready {
                query: query.trim().to_string(),
            };
        }
    }

    /// Consume the auto-search arm. Returns the query to search at most once per offer.
    pub fn take_auto_search(&mut self) -> Option<String> {
        if !self.auto_search {
            return None;
        }
        match &self.state {
            PanelState::Ready { query } => {
                self.auto_search = false;
                Some(query.clone())
            }
            _ => None,
        }
    }

    /// Move to `Searching`. Blank queries are rejected without leaving the current state.
    pub fn begin_search(&mut self, query: &str) -> Result<String, FetchError> {
        match self.state {
            PanelState::Closed => {
                return Err(FetchError::Validation("Import panel is closed".to_string()))
            }
            PanelState::Searching { .. } | PanelState::Importing { .. } => {
                return Err(FetchError::Validation("Import panel is busy".to_string()))
            }
            _ => {}
        }

        let query = query.trim();
        if query.is_empty() {
            let err = FetchError::Validation("Type something to search".to_string());
            self.last_error = Some(err.clone());
            return Err(err);
        }

        self.auto_search = false;
        self.last_error = None;
        self.state = PanelState::Searching {
            query: query.to_string(),
        };
        Ok(query.to_string())
    }

    /// Settle a search started with [`ImportPanel::begin_search`].
    ///
    /// Results for a query the panel is no longer searching are dropped.
    pub fn finish_search(
        &mut self,
        query: &str,
        result: Result<Vec<ExternalCandidate>, FetchError>,
    ) -> bool {
        match &self.state {
            PanelState::Searching { query: current } if current == query => {}
            _ => {
                warn!(query = %query, "Dropping stale external search result");
                return false;
            }
        }

        let query = query.to_string();
        self.state = match result {
            Ok(candidates) if candidates.is_empty() => PanelState::NoResults { query },
            Ok(candidates) => PanelState::Results { query, candidates },
            Err(error) => {
                self.last_error = Some(error.clone());
                PanelState::Error { query, error }
            }
        };
        debug!(state = self.state.name(), "External search settled");
        true
    }

    /// Search the external catalog.
    pub async fn search(&mut self, query: &str) -> Result<&PanelState, FetchError> {
        let query = self.begin_search(query)?;
        let result = self.external.search(&query).await.map_err(FetchError::from);
        self.finish_search(&query, result);
        Ok(&self.state)
    }

    /// Run the armed auto-search, if any.
    pub async fn run_auto_search(&mut self) -> Option<Result<&PanelState, FetchError>> {
        let query = self.take_auto_search()?;
        Some(self.search(&query).await)
    }

    /// Move to `Importing` for `candidate`. Only allowed from `Results`.
    pub fn begin_import(&mut self, candidate: &ExternalCandidate) -> Result<ProviderId, FetchError> {
        let provider_id = candidate.provider_id.clone().ok_or_else(|| {
            FetchError::Validation(format!("'{}' has no provider id", candidate.display_title()))
        })?;

        let (query, candidates) = match &self.state {
            PanelState::Results { query, candidates } => (query.clone(), candidates.clone()),
            other => {
                return Err(FetchError::Validation(format!(
                    "Cannot import while {}",
                    other.name()
                )))
            }
        };

        self.state = PanelState::Importing {
            query,
            candidates,
            provider_id: provider_id.clone(),
        };
        Ok(provider_id)
    }

    /// Settle an import and return to `Results`, whatever the outcome.
    pub fn finish_import(
        &mut self,
        result: Result<MovieSummary, FetchError>,
    ) -> Result<MovieSummary, FetchError> {
        if let PanelState::Importing {
            query, candidates, ..
        } = &self.state
        {
            self.state = PanelState::Results {
                query: query.clone(),
                candidates: candidates.clone(),
            };
        }

        match &result {
            Ok(movie) => {
                info!(id = %movie.id, title = %movie.title, "Imported external title");
                self.last_error = None;
            }
            Err(error) => {
                warn!(error = %error, "External import failed");
                self.last_error = Some(error.clone());
            }
        }
        result
    }

    /// Import `candidate` into the local catalog.
    pub async fn import(&mut self, candidate: &ExternalCandidate) -> Result<MovieSummary, FetchError> {
        let provider_id = self.begin_import(candidate)?;
        let result = self
            .external
            .import(&provider_id)
            .await
            .map_err(FetchError::from);
        self.finish_import(result)
    }

    /// Close the panel. The next offer auto-searches again.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Closing import panel");
        }
        self.state = PanelState::Closed;
        self.auto_search = false;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_catalog::ExternalCatalogError;
    use crate::testing::{fixtures, MockExternalCatalog};

    fn filter(search: &str, genre: &str) -> FilterState {
        FilterState {
            search: search.to_string(),
            genre: genre.to_string(),
            ..Default::default()
        }
    }

    fn panel_with(external: &Arc<MockExternalCatalog>) -> ImportPanel {
        ImportPanel::new(external.clone())
    }

    #[test]
    fn test_offer_rule() {
        let empty = ResultPage::empty();
        assert!(should_offer_external(&filter("matrix", ""), &empty));
        assert!(!should_offer_external(&filter("", "bélico"), &empty));
        assert!(!should_offer_external(&filter("   ", ""), &empty));

        let mut page = ResultPage::empty();
        page.items.push(fixtures::movie("1", "Matrix", 1999, &[]));
        assert!(!should_offer_external(&filter("matrix", ""), &page));
    }

    #[tokio::test]
    async fn test_auto_search_runs_once_per_offer() {
        let external = Arc::new(MockExternalCatalog::new());
        external
            .add_candidate(fixtures::candidate("603", "The Matrix", 1999))
            .await;
        let mut panel = panel_with(&external);

        assert!(panel.offer("  matrix "));
        assert!(!panel.offer("other"));

        let state = panel.run_auto_search().await.unwrap().unwrap();
        assert_eq!(state.candidates().len(), 1);
        assert!(panel.run_auto_search().await.is_none());
        assert_eq!(external.search_queries().await, vec!["matrix".to_string()]);
    }

    #[tokio::test]
    async fn test_close_rearms_next_offer() {
        let external = Arc::new(MockExternalCatalog::new());
        let mut panel = panel_with(&external);

        panel.offer("alien");
        panel.run_auto_search().await.unwrap().unwrap();
        assert!(matches!(panel.state(), PanelState::NoResults { .. }));

        panel.close();
        assert!(!panel.auto_search_armed());

        panel.offer("alien");
        assert!(panel.run_auto_search().await.is_some());
        assert_eq!(external.search_queries().await.len(), 2);
    }

    #[tokio::test]
    async fn test_closing_before_auto_search_disarms() {
        let external = Arc::new(MockExternalCatalog::new());
        let mut panel = panel_with(&external);

        panel.offer("alien");
        panel.close();
        assert!(panel.take_auto_search().is_none());
        assert_eq!(external.search_queries().await.len(), 0);
    }

    #[tokio::test]
    async fn test_blank_search_stays_put() {
        let external = Arc::new(MockExternalCatalog::new());
        let mut panel = panel_with(&external);
        panel.open("");

        let err = panel.search("  ").await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
        assert!(matches!(panel.state(), PanelState::Ready { .. }));
        assert!(panel.last_error().is_some());
        assert_eq!(external.search_queries().await.len(), 0);
    }

    #[tokio::test]
    async fn test_search_error_state() {
        let external = Arc::new(MockExternalCatalog::new());
        external
            .set_next_error(ExternalCatalogError::Http(crate::http::HttpError::Status {
                status: 502,
                message: "TMDB down".to_string(),
            }))
            .await;
        let mut panel = panel_with(&external);
        panel.open("matrix");

        panel.search("matrix").await.unwrap();
        match panel.state() {
            PanelState::Error { error, .. } => assert!(error.is_retryable()),
            other => panic!("unexpected state {:?}", other),
        }

        // retry from Error is allowed
        panel.search("matrix").await.unwrap();
        assert!(matches!(panel.state(), PanelState::NoResults { .. }));
    }

    #[tokio::test]
    async fn test_import_returns_to_results() {
        let external = Arc::new(MockExternalCatalog::new());
        let candidate = fixtures::candidate("603", "The Matrix", 1999);
        external.add_candidate(candidate.clone()).await;
        let mut panel = panel_with(&external);
        panel.open("matrix");
        panel.search("matrix").await.unwrap();

        let movie = panel.import(&candidate).await.unwrap();
        assert_eq!(movie.title, "The Matrix");
        assert!(matches!(panel.state(), PanelState::Results { .. }));

        let err = panel.import(&candidate).await.unwrap_err();
        assert!(matches!(err, FetchError::ImportConflict(_)));
        assert!(matches!(panel.state(), PanelState::Results { .. }));
        assert_eq!(panel.last_error(), Some(&err));
        assert_eq!(external.search_queries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_requires_results_and_id() {
        let external = Arc::new(MockExternalCatalog::new());
        let mut panel = panel_with(&external);
        let candidate = fixtures::candidate("1", "Alien", 1979);

        assert!(panel.import(&candidate).await.is_err());

        let mut no_id = candidate.clone();
        no_id.provider_id = None;
        assert!(matches!(
            panel.begin_import(&no_id),
            Err(FetchError::Validation(_))
        ));
    }

    #[test]
    fn test_stale_search_result_is_dropped() {
        let external = Arc::new(MockExternalCatalog::new());
        let mut panel = panel_with(&external);
        panel.open("a");

        panel.begin_search("a").unwrap();
        panel.close();
        assert!(!panel.finish_search("a", Ok(Vec::new())));
        assert_eq!(panel.state(), &PanelState::Closed);
    }
}
