use anyhow::{Context, Result};

use filmoteca_core::{fallback::PanelState, filter::decode, FetchError};

use crate::cli::ImportArgs;
use crate::output::{self, emit};
use crate::state::AppState;

pub async fn execute(state: &AppState, args: ImportArgs) -> Result<()> {
    let query = match args.query {
        Some(query) => query,
        None => decode(&state.store().load()?.location)
            .search_term()
            .map(str::to_string)
            .context("Nothing to look up: pass a title or list with --search first")?,
    };

    let mut panel = state.import_panel();
    panel.open(&query);
    let candidates = match panel.search(&query).await? {
        PanelState::Results { candidates, .. } => candidates.clone(),
        PanelState::NoResults { query } => {
            println!("No TMDB results for \"{}\"", query);
            return Ok(());
        }
        PanelState::Error { error, .. } => return Err(error.clone().into()),
        other => anyhow::bail!("Unexpected import state: {}", other.name()),
    };

    let Some(pick) = args.pick else {
        return emit(state.format(), &candidates, || {
            for candidate in &candidates {
                println!(
                    "{}",
                    output::candidate_line(candidate, &state.config().images)
                );
            }
            println!("Import one with: filmoteca import \"{}\" --pick <id>", query);
        });
    };

    let candidate = candidates
        .iter()
        .find(|c| c.provider_id.as_ref().is_some_and(|id| id.as_str() == pick))
        .cloned()
        .ok_or_else(|| FetchError::NotFound(format!("TMDB id {} among the results", pick)))?;

    let view = state.list_view()?;
    let (movie, snapshot) = view.import_external(&mut panel, &candidate).await?;
    state.save_location(&view).await?;

    emit(state.format(), &movie, || {
        println!("Imported {}", output::movie_line(&movie).trim_start());
        if let Some(page) = &snapshot.page {
            output::print_page(page);
        }
    })
}
