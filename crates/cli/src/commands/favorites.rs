use anyhow::Result;

use filmoteca_core::{favorites::AddOutcome, FetchError};

use crate::cli::FavoritesCommand;
use crate::output::{self, emit};
use crate::state::AppState;

pub async fn execute(state: &AppState, cmd: FavoritesCommand) -> Result<()> {
    let favorites = state.favorites();
    match cmd {
        FavoritesCommand::List => {
            let movies = favorites.list()?;
            emit(state.format(), &movies, || {
                if movies.is_empty() {
                    println!("No favorites yet");
                }
                for movie in &movies {
                    println!("{}", output::movie_line(movie));
                }
            })
        }
        FavoritesCommand::Add { movie_id } => {
            let movie = state
                .catalog()
                .get(&movie_id)
                .await
                .map_err(FetchError::from)?;
            match favorites.add(&movie)? {
                AddOutcome::Added => println!("Added {} to favorites", movie.display_title()),
                AddOutcome::AlreadyPresent => {
                    println!("{} is already a favorite", movie.display_title())
                }
            }
            Ok(())
        }
        FavoritesCommand::Remove { movie_id } => {
            if favorites.remove(&movie_id)? {
                println!("Removed {}", movie_id);
            } else {
                println!("{} was not a favorite", movie_id);
            }
            Ok(())
        }
        FavoritesCommand::Clear => {
            favorites.clear()?;
            println!("Favorites cleared");
            Ok(())
        }
    }
}
