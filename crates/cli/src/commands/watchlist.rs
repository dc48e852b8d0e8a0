use anyhow::Result;

use crate::cli::WatchlistCommand;
use crate::output::emit;
use crate::state::AppState;

pub async fn execute(state: &AppState, cmd: WatchlistCommand) -> Result<()> {
    let watchlist = state.watchlist();
    match cmd {
        WatchlistCommand::List => {
            let entries = watchlist.list().await?;
            emit(state.format(), &entries, || {
                if entries.is_empty() {
                    println!("Watchlist is empty");
                }
                for entry in &entries {
                    println!("  {:<26}  {} [{}]", entry.id, entry.title(), entry.movie.id());
                }
            })
        }
        WatchlistCommand::Add { movie_id } => {
            watchlist.add(&movie_id).await?;
            println!("Added {} to the watchlist", movie_id);
            Ok(())
        }
        WatchlistCommand::Remove { entry_id } => {
            watchlist.remove(&entry_id).await?;
            println!("Removed {}", entry_id);
            Ok(())
        }
    }
}
