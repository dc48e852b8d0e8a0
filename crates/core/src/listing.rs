//! Catalog-list view.
//!
//! The view keeps no filter state of its own: it reads the filters from the
//! shared [`Location`] and caches the last fetched page. Every fetch takes a
//! ticket from a monotonically increasing sequence; a response is applied
//! only if its ticket is still the latest, so a slow response for an older
//! filter never replaces the page of a newer one.
//!
//! Location writes and ticket issues happen under one lock, so ticket order
//! always follows location order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::catalog::{MovieSummary, ResultPage};
use crate::error::FetchError;
use crate::external_catalog::ExternalCandidate;
use crate::fallback::{should_offer_external, ImportPanel};
use crate::filter::{FilterState, FilterUpdate, Location};
use crate::search::ResultFetcher;

/// What the view currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSnapshot {
    /// Filters the view was last asked to show.
    pub filter: FilterState,
    /// Last successfully fetched page; kept across failed fetches.
    pub page: Option<ResultPage>,
    /// Failure of the latest fetch, if it failed.
    pub error: Option<FetchError>,
    pub loading: bool,
}

impl ViewSnapshot {
    pub fn items(&self) -> &[MovieSummary] {
        self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    /// True when a fetch succeeded and matched nothing.
    pub fn is_no_results(&self) -> bool {
        self.error.is_none() && self.page.as_ref().is_some_and(ResultPage::is_empty)
    }
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    filter: FilterState,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }
}

/// The paginated, filterable catalog list.
#[derive(Debug)]
pub struct CatalogListView {
    fetcher: ResultFetcher,
    location: Location,
    profile_id: Option<String>,
    seq: AtomicU64,
    detached: AtomicBool,
    snapshot: RwLock<ViewSnapshot>,
    ordering: Mutex<()>,
}

impl CatalogListView {
    pub fn new(fetcher: ResultFetcher, location: Location, profile_id: Option<String>) -> Self {
        Self {
            fetcher,
            location,
            profile_id,
            seq: AtomicU64::new(0),
            detached: AtomicBool::new(false),
            snapshot: RwLock::new(ViewSnapshot::default()),
            ordering: Mutex::new(()),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Start a fetch for `filter`, superseding any fetch in flight.
    pub async fn begin(&self, filter: FilterState) -> FetchTicket {
        let mut snapshot = self.snapshot.write().await;
        self.issue(&mut snapshot, filter)
    }

    fn issue(&self, snapshot: &mut ViewSnapshot, filter: FilterState) -> FetchTicket {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        snapshot.filter = filter.clone();
        snapshot.loading = true;
        debug!(seq, ?filter, "Fetch issued");
        FetchTicket { seq, filter }
    }

    /// Whether `ticket` is still the latest fetch of an attached view.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        !self.detached.load(Ordering::SeqCst) && self.seq.load(Ordering::SeqCst) == ticket.seq
    }

    /// Apply the outcome of a fetch. Returns false if it was superseded.
    pub async fn complete(
        &self,
        ticket: &FetchTicket,
        result: Result<ResultPage, FetchError>,
    ) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if !self.is_current(ticket) {
            warn!(seq = ticket.seq, "Dropping stale catalog response");
            return false;
        }

        snapshot.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    seq = ticket.seq,
                    items = page.items.len(),
                    page = page.page,
                    total_pages = page.total_pages,
                    "Catalog page received"
                );
                snapshot.page = Some(page);
                snapshot.error = None;
            }
            Err(error) => {
                warn!(seq = ticket.seq, error = %error, "Catalog fetch failed");
                snapshot.error = Some(error);
            }
        }
        true
    }

    async fn run(&self, ticket: FetchTicket) -> ViewSnapshot {
        let result = self
            .fetcher
            .list(&ticket.filter, self.profile_id.as_deref())
            .await;
        self.complete(&ticket, result).await;
        self.snapshot().await
    }

    /// Refetch the filters currently in the location.
    pub async fn refresh(&self) -> ViewSnapshot {
        let ticket = {
            let _order = self.ordering.lock().await;
            let filter = self.location.filter().await;
            self.begin(filter).await
        };
        self.run(ticket).await
    }

    /// Rehydrate from the location after an outside change (e.g., back/forward).
    ///
    /// Fetches only when the location's filters differ from what the view
    /// shows or is loading.
    pub async fn sync(&self) -> ViewSnapshot {
        let ticket = {
            let _order = self.ordering.lock().await;
            let filter = self.location.filter().await;
            let mut snapshot = self.snapshot.write().await;
            let settled = snapshot.loading || snapshot.page.is_some() || snapshot.error.is_some();
            if snapshot.filter == filter && settled {
                debug!("Location unchanged, keeping current page");
                return snapshot.clone();
            }
            self.issue(&mut snapshot, filter)
        };
        self.run(ticket).await
    }

    /// Apply a filter or page change and fetch the result once.
    ///
    /// Invalid input fails before the location or the network is touched.
    pub async fn update(&self, update: FilterUpdate) -> Result<ViewSnapshot, FetchError> {
        update.validate()?;
        if update.is_empty() {
            return Ok(self.sync().await);
        }

        let ticket = {
            let _order = self.ordering.lock().await;
            let navigation = self.location.apply(&update).await;
            if navigation.changed {
                info!(query = %navigation.query, mode = ?navigation.mode, "Filters changed");
                Some(self.begin(navigation.filter).await)
            } else {
                None
            }
        };

        match ticket {
            Some(ticket) => Ok(self.run(ticket).await),
            None => Ok(self.sync().await),
        }
    }

    pub async fn next_page(&self) -> Result<ViewSnapshot, FetchError> {
        let page = self.current_page().await?;
        if !page.has_next() {
            return Err(FetchError::Validation("Already on the last page".to_string()));
        }
        self.update(FilterUpdate::page(page.page + 1)).await
    }

    pub async fn prev_page(&self) -> Result<ViewSnapshot, FetchError> {
        let page = self.current_page().await?;
        if !page.has_prev() {
            return Err(FetchError::Validation("Already on the first page".to_string()));
        }
        self.update(FilterUpdate::page(page.page - 1)).await
    }

    async fn current_page(&self) -> Result<ResultPage, FetchError> {
        self.snapshot
            .read()
            .await
            .page
            .clone()
            .ok_or_else(|| FetchError::Validation("Nothing loaded yet".to_string()))
    }

    pub async fn clear_filters(&self) -> Result<ViewSnapshot, FetchError> {
        self.update(FilterUpdate::clear_all()).await
    }

    /// Step back in the location history and rehydrate.
    pub async fn back(&self) -> Option<ViewSnapshot> {
        self.location.back().await?;
        Some(self.sync().await)
    }

    pub async fn forward(&self) -> Option<ViewSnapshot> {
        self.location.forward().await?;
        Some(self.sync().await)
    }

    /// Stop applying responses. In-flight fetches are ignored when they land.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
        self.seq.fetch_add(1, Ordering::SeqCst);
        debug!("Catalog view detached");
    }

    /// Search term to seed the external search with, when the offer applies.
    pub async fn external_offer(&self) -> Option<String> {
        let snapshot = self.snapshot.read().await;
        if snapshot.error.is_some() || snapshot.loading {
            return None;
        }
        let page = snapshot.page.as_ref()?;
        if should_offer_external(&snapshot.filter, page) {
            snapshot.filter.search_term().map(str::to_string)
        } else {
            None
        }
    }

    /// Import an external candidate through `panel`.
    ///
    /// On success the current page is dropped and page 1 is refetched. On
    /// failure the page stays as it was and the panel stays open.
    pub async fn import_external(
        &self,
        panel: &mut ImportPanel,
        candidate: &ExternalCandidate,
    ) -> Result<(MovieSummary, ViewSnapshot), FetchError> {
        let movie = panel.import(candidate).await?;

        let ticket = {
            let _order = self.ordering.lock().await;
            self.snapshot.write().await.page = None;
            let navigation = self.location.apply(&FilterUpdate::page(1)).await;
            self.begin(navigation.filter).await
        };
        Ok((movie, self.run(ticket).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::CatalogError;
    use crate::http::HttpError;
    use crate::testing::{fixtures, MockCatalog, MockExternalCatalog};

    async fn view_over(catalog: &Arc<MockCatalog>, query: &str) -> CatalogListView {
        CatalogListView::new(
            ResultFetcher::new(catalog.clone(), 12),
            Location::new(query),
            Some("p1".to_string()),
        )
    }

    #[tokio::test]
    async fn test_genre_change_from_page_three_fetches_page_one_once() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_movies(fixtures::movies(60)).await;
        let view = view_over(&catalog, "search=pel&page=3").await;
        view.refresh().await;
        catalog.clear_recorded().await;

        let snapshot = view.update(FilterUpdate::genre("drama")).await.unwrap();

        assert_eq!(view.location().query().await, "search=pel&genre=drama");
        assert_eq!(snapshot.filter.page, 1);
        let requests = catalog.list_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].filter.genre, "drama");
        assert_eq!(requests[0].filter.page, 1);
    }

    #[tokio::test]
    async fn test_stale_ticket_is_dropped() {
        let catalog = Arc::new(MockCatalog::new());
        let view = view_over(&catalog, "").await;

        let a = view.begin(fixtures::filter_with_genre("acción")).await;
        let b = view.begin(fixtures::filter_with_genre("drama")).await;

        let mut page_b = ResultPage::empty();
        page_b.items.push(fixtures::movie("b", "B", 2001, &["drama"]));
        assert!(view.complete(&b, Ok(page_b.clone())).await);

        let mut page_a = ResultPage::empty();
        page_a.items.push(fixtures::movie("a", "A", 2000, &["acción"]));
        assert!(!view.complete(&a, Ok(page_a)).await);

        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.page, Some(page_b));
        assert_eq!(snapshot.filter.genre, "drama");
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_page() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_movies(fixtures::movies(5)).await;
        let view = view_over(&catalog, "").await;
        let first = view.refresh().await;
        assert_eq!(first.items().len(), 5);

        catalog
            .set_next_error(CatalogError::Http(HttpError::Status {
                status: 500,
                message: "boom".to_string(),
            }))
            .await;
        let snapshot = view.update(FilterUpdate::year("1999")).await.unwrap();

        assert_eq!(snapshot.items().len(), 5);
        assert!(snapshot.error.as_ref().is_some_and(FetchError::is_retryable));
        assert!(!snapshot.is_no_results());
    }

    #[tokio::test]
    async fn test_invalid_year_makes_no_call() {
        let catalog = Arc::new(MockCatalog::new());
        let view = view_over(&catalog, "").await;

        let err = view.update(FilterUpdate::year("99")).await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
        assert_eq!(catalog.call_count().await, 0);
        assert_eq!(view.location().query().await, "");
    }

    #[tokio::test]
    async fn test_paging_replaces_history() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_movies(fixtures::movies(30)).await;
        let view = view_over(&catalog, "").await;
        view.refresh().await;

        view.next_page().await.unwrap();
        let snapshot = view.next_page().await.unwrap();
        assert_eq!(snapshot.page.as_ref().map(|p| p.page), Some(3));
        assert!(view.next_page().await.is_err());
        assert_eq!(view.location().history_len().await, 1);

        view.prev_page().await.unwrap();
        assert_eq!(view.location().query().await, "page=2");
    }

    #[tokio::test]
    async fn test_back_rehydrates_from_location() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_movies(fixtures::movies(30)).await;
        let view = view_over(&catalog, "").await;
        view.refresh().await;

        view.update(FilterUpdate::genre("drama")).await.unwrap();
        let snapshot = view.back().await.unwrap();
        assert_eq!(snapshot.filter, FilterState::default());

        // same filters again: no extra fetch
        let before = catalog.list_requests().await.len();
        view.sync().await;
        assert_eq!(catalog.list_requests().await.len(), before);
    }

    #[tokio::test]
    async fn test_detached_view_ignores_responses() {
        let catalog = Arc::new(MockCatalog::new());
        let view = view_over(&catalog, "").await;
        let ticket = view.begin(FilterState::default()).await;
        view.detach();

        assert!(!view.complete(&ticket, Ok(ResultPage::empty())).await);
        assert!(view.snapshot().await.page.is_none());
    }

    #[tokio::test]
    async fn test_offer_and_import_refetches_page_one() {
        let catalog = Arc::new(MockCatalog::new());
        let external = Arc::new(MockExternalCatalog::new());
        let candidate = fixtures::candidate("603", "The Matrix", 1999);
        external.add_candidate(candidate.clone()).await;

        let view = view_over(&catalog, "search=matrix").await;
        let snapshot = view.refresh().await;
        assert!(snapshot.is_no_results());
        let term = view.external_offer().await.unwrap();
        assert_eq!(term, "matrix");

        let mut panel = ImportPanel::new(external.clone());
        panel.offer(&term);
        panel.run_auto_search().await.unwrap().unwrap();

        catalog.clear_recorded().await;
        let (movie, _) = view.import_external(&mut panel, &candidate).await.unwrap();
        assert_eq!(movie.title, "The Matrix");
        let requests = catalog.list_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].filter.page, 1);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_page_untouched() {
        let catalog = Arc::new(MockCatalog::new());
        let external = Arc::new(MockExternalCatalog::new());
        let candidate = fixtures::candidate("603", "The Matrix", 1999);
        external.add_candidate(candidate.clone()).await;
        external.mark_imported("603").await;

        let view = view_over(&catalog, "search=matrix").await;
        let before = view.refresh().await;

        let mut panel = ImportPanel::new(external.clone());
        panel.offer("matrix");
        panel.run_auto_search().await.unwrap().unwrap();
        catalog.clear_recorded().await;

        let err = view.import_external(&mut panel, &candidate).await.unwrap_err();
        assert!(matches!(err, FetchError::ImportConflict(_)));
        assert!(panel.is_open());
        assert_eq!(view.snapshot().await, before);
        assert_eq!(catalog.call_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_settle_on_location() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.set_movies(fixtures::movies(60)).await;
        let view = Arc::new(view_over(&catalog, "").await);
        let genres = ["acción", "drama", "comedia", "terror", "romance", "crimen"];

        for _ in 0..20 {
            let handles: Vec<_> = genres
                .iter()
                .copied()
                .map(|genre| {
                    let view = Arc::clone(&view);
                    tokio::spawn(async move { view.update(FilterUpdate::genre(genre)).await })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let snapshot = view.snapshot().await;
            assert!(!snapshot.loading);
            assert_eq!(snapshot.filter, view.location().filter().await);
            assert!(snapshot
                .items()
                .iter()
                .all(|m| m.genres.contains(&snapshot.filter.genre)));
        }
    }

    #[tokio::test]
    async fn test_genre_only_never_offers() {
        let catalog = Arc::new(MockCatalog::new());
        let view = view_over(&catalog, "genre=b%C3%A9lico").await;
        let snapshot = view.refresh().await;
        assert!(snapshot.is_no_results());
        assert!(view.external_offer().await.is_none());
    }
}
