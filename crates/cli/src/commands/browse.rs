use anyhow::Result;
use serde_json::json;
use tracing::warn;

use filmoteca_core::{
    external_catalog::ExternalCandidate,
    fallback::{ImportPanel, PanelState},
    filter::{FilterUpdate, HistoryMode},
    listing::{CatalogListView, ViewSnapshot},
    FetchError,
};

use crate::cli::{ListArgs, SearchArgs};
use crate::output::{self, emit};
use crate::state::AppState;

pub async fn search(state: &AppState, args: SearchArgs) -> Result<()> {
    let term = args.term.join(" ");
    let results = state.fetcher().search(&term).await?;
    emit(state.format(), &results, || output::print_search(&results))
}

/// Translate `list` flags into one filter update.
fn filter_update(args: &ListArgs) -> FilterUpdate {
    let mut update = if args.clear {
        FilterUpdate::clear_all()
    } else {
        FilterUpdate::default()
    };
    if let Some(search) = &args.search {
        update = update.with_search(search.as_str());
    }
    if let Some(genre) = &args.genre {
        update = update.with_genre(genre.as_str());
    }
    if let Some(year) = &args.year {
        update = update.with_year(year.as_str());
    }
    if let Some(page) = args.page {
        update.page = Some(page);
    }
    update
}

pub async fn list(state: &AppState, args: ListArgs) -> Result<()> {
    let view = state.list_view()?;

    let snapshot = match &args.location {
        Some(location) => {
            view.location().navigate(location, HistoryMode::Push).await;
            view.sync().await
        }
        None => view.update(filter_update(&args)).await?,
    };

    finish(state, &view, snapshot).await
}

pub async fn next(state: &AppState) -> Result<()> {
    let view = state.list_view()?;
    view.refresh().await;
    let snapshot = view.next_page().await?;
    finish(state, &view, snapshot).await
}

pub async fn prev(state: &AppState) -> Result<()> {
    let view = state.list_view()?;
    view.refresh().await;
    let snapshot = view.prev_page().await?;
    finish(state, &view, snapshot).await
}

/// What the automatic external search turned up for an offered term.
#[derive(Debug, Default)]
struct ExternalLookup {
    candidates: Vec<ExternalCandidate>,
    error: Option<FetchError>,
}

/// Run the panel's armed auto-search for `term`.
///
/// An empty result and a failed search stay distinct.
async fn external_lookup(panel: &mut ImportPanel, term: &str) -> ExternalLookup {
    if !panel.offer(term) {
        return ExternalLookup::default();
    }
    match panel.run_auto_search().await {
        Some(Ok(PanelState::Results { candidates, .. })) => ExternalLookup {
            candidates: candidates.clone(),
            error: None,
        },
        Some(Ok(PanelState::Error { error, .. })) => ExternalLookup {
            candidates: Vec::new(),
            error: Some(error.clone()),
        },
        Some(Err(error)) => ExternalLookup {
            candidates: Vec::new(),
            error: Some(error),
        },
        _ => ExternalLookup::default(),
    }
}

/// Save the location, print the page and, when nothing matched a text
/// search, run the external search and list what could be imported.
async fn finish(state: &AppState, view: &CatalogListView, snapshot: ViewSnapshot) -> Result<()> {
    state.save_location(view).await?;
    if let Some(error) = snapshot.error {
        return Err(error.into());
    }

    let query = view.location().query().await;
    let Some(page) = snapshot.page else {
        anyhow::bail!("Catalog fetch did not complete");
    };

    let offer = view.external_offer().await;
    let lookup = match &offer {
        Some(term) => external_lookup(&mut state.import_panel(), term).await,
        None => ExternalLookup::default(),
    };
    if let Some(error) = &lookup.error {
        warn!(error = %error, "External search failed");
    }

    let value = json!({
        "location": query,
        "page": page,
        "external": lookup.candidates,
        "external_error": lookup.error.as_ref().map(ToString::to_string),
    });
    emit(state.format(), &value, || {
        if !query.is_empty() {
            println!("?{}", query);
        }
        if page.is_empty() {
            println!("No movies match these filters");
        } else {
            output::print_page(&page);
        }
        if let Some(term) = &offer {
            if let Some(error) = &lookup.error {
                println!(
                    "TMDB search failed: {} (retry with: filmoteca import \"{}\")",
                    error, term
                );
            } else if lookup.candidates.is_empty() {
                println!("Nothing on TMDB for \"{}\" either", term);
            } else {
                println!();
                println!("Found on TMDB:");
                for candidate in &lookup.candidates {
                    println!(
                        "{}",
                        output::candidate_line(candidate, &state.config().images)
                    );
                }
                println!("Import one with: filmoteca import \"{}\" --pick <id>", term);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use filmoteca_core::{
        external_catalog::ExternalCatalogError,
        testing::{fixtures, MockExternalCatalog},
        HttpError,
    };

    fn args() -> ListArgs {
        ListArgs {
            search: None,
            genre: None,
            year: None,
            page: None,
            clear: false,
            location: None,
        }
    }

    #[test]
    fn test_filter_update_from_flags() {
        let update = filter_update(&ListArgs {
            genre: Some("drama".to_string()),
            page: Some(3),
            ..args()
        });
        assert_eq!(update.genre.as_deref(), Some("drama"));
        assert_eq!(update.page, Some(3));
        assert!(update.search.is_none());
    }

    #[test]
    fn test_clear_keeps_new_filters() {
        let update = filter_update(&ListArgs {
            clear: true,
            year: Some("1999".to_string()),
            ..args()
        });
        assert_eq!(update.search.as_deref(), Some(""));
        assert_eq!(update.year.as_deref(), Some("1999"));
        assert!(filter_update(&args()).is_empty());
    }

    #[tokio::test]
    async fn test_external_failure_is_not_reported_as_empty() {
        let external = Arc::new(MockExternalCatalog::new());
        external
            .set_next_error(ExternalCatalogError::Http(HttpError::Status {
                status: 502,
                message: "TMDB down".to_string(),
            }))
            .await;
        let mut panel = ImportPanel::new(external.clone());

        let lookup = external_lookup(&mut panel, "matrix").await;

        assert!(lookup.candidates.is_empty());
        let error = lookup.error.expect("failure should be kept");
        assert!(error.is_retryable());
        assert!(error.to_string().contains("TMDB down"));
    }

    #[tokio::test]
    async fn test_external_lookup_results_and_empty() {
        let external = Arc::new(MockExternalCatalog::new());
        external
            .add_candidate(fixtures::candidate("603", "The Matrix", 1999))
            .await;

        let found = external_lookup(&mut ImportPanel::new(external.clone()), "matrix").await;
        assert_eq!(found.candidates.len(), 1);
        assert!(found.error.is_none());

        let empty = external_lookup(&mut ImportPanel::new(external.clone()), "zzz").await;
        assert!(empty.candidates.is_empty());
        assert!(empty.error.is_none());
    }
}
