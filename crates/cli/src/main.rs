mod cli;
mod commands;
mod output;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmoteca_core::{load_config, validate_config};

use cli::{Cli, Command};
use state::AppState;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG: &str = "filmoteca.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    debug!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;
    info!(base_url = %config.api.base_url, "Configuration loaded");

    let state = AppState::connect(config, cli.format)
        .await
        .context("Failed to initialize client")?;

    match cli.command {
        Command::Login(args) => commands::auth::login(&state, args).await,
        Command::Register(args) => commands::auth::register(&state, args).await,
        Command::Logout => commands::auth::logout(&state).await,
        Command::Whoami => commands::auth::whoami(&state),
        Command::Config => commands::config::show(&state),
        Command::Profiles(cmd) => commands::profiles::execute(&state, cmd).await,
        Command::Search(args) => commands::browse::search(&state, args).await,
        Command::List(args) => commands::browse::list(&state, args).await,
        Command::Next => commands::browse::next(&state).await,
        Command::Prev => commands::browse::prev(&state).await,
        Command::Movie(cmd) => commands::movie::execute(&state, cmd).await,
        Command::Watchlist(cmd) => commands::watchlist::execute(&state, cmd).await,
        Command::Favorites(cmd) => commands::favorites::execute(&state, cmd).await,
        Command::Import(args) => commands::import::execute(&state, args).await,
    }
}
