use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use filmoteca_core::{
    auth::{AuthSession, HttpIdentityProvider},
    catalog::{CatalogService, HttpCatalog},
    external_catalog::{ExternalCatalog, TmdbClient},
    favorites::Favorites,
    fallback::ImportPanel,
    filter::Location,
    listing::CatalogListView,
    profiles::{HttpProfileService, ProfileManager},
    search::ResultFetcher,
    session::{FileSessionStore, SessionStore},
    watchlist::{HttpWatchlistService, WatchlistManager},
    ApiClient, Config, SanitizedConfig,
};

use crate::cli::OutputFormat;

/// Wired services for one command invocation.
pub struct AppState {
    config: Config,
    format: OutputFormat,
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn CatalogService>,
    external: Arc<dyn ExternalCatalog>,
    auth: AuthSession,
    profiles: ProfileManager,
    watchlist: WatchlistManager,
    favorites: Favorites,
}

impl AppState {
    /// Build every client and load the stored session token.
    pub async fn connect(config: Config, format: OutputFormat) -> Result<Self> {
        let api = ApiClient::new(&config.api).context("Failed to build HTTP client")?;
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.session.path.clone()));

        let auth = AuthSession::new(
            Arc::new(HttpIdentityProvider::new(api.clone())),
            Arc::clone(&store),
            api.clone(),
        );
        if let Some(claims) = auth.restore().await.context("Failed to read session")? {
            debug!(sub = claims.sub.as_deref().unwrap_or("-"), "Session restored");
        }

        let state = Self {
            format,
            catalog: Arc::new(HttpCatalog::new(api.clone())),
            external: Arc::new(TmdbClient::new(api.clone())),
            profiles: ProfileManager::new(
                Arc::new(HttpProfileService::new(api.clone())),
                Arc::clone(&store),
            ),
            watchlist: WatchlistManager::new(
                Arc::new(HttpWatchlistService::new(api)),
                Arc::clone(&store),
            ),
            favorites: Favorites::new(Arc::clone(&store)),
            auth,
            store,
            config,
        };
        info!(session = ?state.config.session.path, "Client ready");
        Ok(state)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> Result<SanitizedConfig> {
        let token_present = self.store.load()?.token.is_some();
        Ok(SanitizedConfig::new(&self.config, token_present))
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogService {
        self.catalog.as_ref()
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }

    pub fn watchlist(&self) -> &WatchlistManager {
        &self.watchlist
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn fetcher(&self) -> ResultFetcher {
        ResultFetcher::new(Arc::clone(&self.catalog), self.config.api.page_size)
    }

    /// List view positioned at the remembered location, scoped to the active profile.
    pub fn list_view(&self) -> Result<CatalogListView> {
        let session = self.store.load()?;
        Ok(CatalogListView::new(
            self.fetcher(),
            Location::new(&session.location),
            session.active_profile.map(|p| p.id),
        ))
    }

    /// Remember where the list view ended up.
    pub async fn save_location(&self, view: &CatalogListView) -> Result<()> {
        let query = view.location().query().await;
        self.store
            .update(&mut |data| data.location = query.clone())
            .context("Failed to save list location")?;
        Ok(())
    }

    pub fn import_panel(&self) -> ImportPanel {
        ImportPanel::new(Arc::clone(&self.external))
    }
}
