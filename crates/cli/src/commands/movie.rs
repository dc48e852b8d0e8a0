use anyhow::Result;

use filmoteca_core::{
    validation::{validate_movie, MovieDraft},
    FetchError,
};

use crate::cli::{MovieArgs, MovieCommand};
use crate::output::{self, emit};
use crate::state::AppState;

impl From<MovieArgs> for MovieDraft {
    fn from(args: MovieArgs) -> Self {
        MovieDraft {
            title: args.title,
            director: args.director,
            year: args.year,
            genres: args.genres,
            overview: args.overview,
            poster: args.poster,
            rating: args.rating,
            age_rating: args.age_rating,
        }
    }
}

pub async fn execute(state: &AppState, cmd: MovieCommand) -> Result<()> {
    let catalog = state.catalog();
    match cmd {
        MovieCommand::Show { id } => {
            let movie = catalog.get(&id).await.map_err(FetchError::from)?;
            emit(state.format(), &movie, || {
                for line in output::movie_detail(&movie, &state.config().images) {
                    println!("{}", line);
                }
            })
        }
        MovieCommand::Create(args) => {
            let draft: MovieDraft = args.into();
            let payload = validate_movie(&draft).map_err(FetchError::from)?;
            let movie = catalog.create(&payload).await.map_err(FetchError::from)?;
            println!("Created {}", output::movie_line(&movie).trim_start());
            Ok(())
        }
        MovieCommand::Update { id, movie } => {
            let draft: MovieDraft = movie.into();
            let payload = validate_movie(&draft).map_err(FetchError::from)?;
            let movie = catalog
                .update(&id, &payload)
                .await
                .map_err(FetchError::from)?;
            println!("Updated {}", output::movie_line(&movie).trim_start());
            Ok(())
        }
        MovieCommand::Delete { id } => {
            catalog.remove(&id).await.map_err(FetchError::from)?;
            state.favorites().remove(&id)?;
            println!("Deleted {}", id);
            Ok(())
        }
    }
}
