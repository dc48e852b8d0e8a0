//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Browse and manage the movie catalog.
#[derive(Debug, Parser)]
#[command(name = "filmoteca", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: filmoteca.toml).
    #[arg(long, short = 'c', env = "FILMOTECA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session.
    Login(LoginArgs),
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Forget the session token and the active profile.
    Logout,
    /// Show the signed-in user and active profile.
    Whoami,
    /// Show the effective configuration.
    Config,
    /// Manage viewer profiles.
    #[command(subcommand)]
    Profiles(ProfilesCommand),
    /// Search the catalog by title, genre or year.
    Search(SearchArgs),
    /// List the catalog with filters; remembers the location.
    List(ListArgs),
    /// Next page of the remembered list.
    Next,
    /// Previous page of the remembered list.
    Prev,
    /// Show, create, edit or delete a movie.
    #[command(subcommand)]
    Movie(MovieCommand),
    /// Watchlist of the active profile.
    #[command(subcommand)]
    Watchlist(WatchlistCommand),
    /// Local favorites.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Search TMDB and import a title into the catalog.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, short = 'e')]
    pub email: String,
    #[arg(long, short = 'p', env = "FILMOTECA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long, short = 'e')]
    pub email: String,
    #[arg(long, short = 'p', env = "FILMOTECA_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Repeat the password.
    #[arg(long)]
    pub confirm: String,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    List,
    Create {
        name: String,
        /// adult or kid
        #[arg(long, default_value = "adult")]
        kind: String,
    },
    Rename {
        id: String,
        name: String,
    },
    Delete {
        id: String,
    },
    /// Make a profile active, by id or name.
    Select {
        profile: String,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free text; a genre or a 4-digit year is searched as such.
    #[arg(required = true, num_args = 1..)]
    pub term: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub search: Option<String>,
    #[arg(long, short = 'g')]
    pub genre: Option<String>,
    #[arg(long, short = 'y')]
    pub year: Option<String>,
    #[arg(long, short = 'p')]
    pub page: Option<u32>,
    /// Drop every filter before applying the others.
    #[arg(long)]
    pub clear: bool,
    /// Open a shared query string, e.g. "search=alien&page=2".
    #[arg(long, conflicts_with_all = ["search", "genre", "year", "page", "clear"])]
    pub location: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum MovieCommand {
    Show { id: String },
    Create(MovieArgs),
    Update {
        id: String,
        #[command(flatten)]
        movie: MovieArgs,
    },
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct MovieArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub year: String,
    /// Comma-separated, e.g. "drama, bélico".
    #[arg(long)]
    pub genres: String,
    #[arg(long, default_value = "")]
    pub director: String,
    #[arg(long, default_value = "")]
    pub overview: String,
    #[arg(long, default_value = "")]
    pub poster: String,
    #[arg(long, default_value = "")]
    pub rating: String,
    #[arg(long, default_value = "")]
    pub age_rating: String,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    List,
    Add { movie_id: String },
    /// Remove by watchlist entry id.
    Remove { entry_id: String },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    List,
    Add { movie_id: String },
    Remove { movie_id: String },
    Clear,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Title to look up; defaults to the search term of the remembered list.
    pub query: Option<String>,
    /// TMDB id of the result to import.
    #[arg(long)]
    pub pick: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_filters() {
        let cli = Cli::parse_from(["filmoteca", "list", "--genre", "drama", "-p", "2"]);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.genre.as_deref(), Some("drama"));
        assert_eq!(args.page, Some(2));
        assert!(args.location.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_location_conflicts_with_filters() {
        let result = Cli::try_parse_from([
            "filmoteca",
            "list",
            "--location",
            "genre=drama",
            "--year",
            "1999",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_joins_words_and_global_flags() {
        let cli = Cli::parse_from([
            "filmoteca",
            "search",
            "ciencia",
            "ficción",
            "--format",
            "json",
            "--config",
            "other.toml",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.term.join(" "), "ciencia ficción");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn test_import_pick() {
        let cli = Cli::parse_from(["filmoteca", "import", "matrix", "--pick", "603"]);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.query.as_deref(), Some("matrix"));
        assert_eq!(args.pick.as_deref(), Some("603"));
    }
}
