pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod external_catalog;
pub mod favorites;
pub mod fallback;
pub mod filter;
pub mod http;
pub mod images;
pub mod listing;
pub mod profiles;
pub mod query;
pub mod search;
pub mod session;
pub mod testing;
pub mod validation;
pub mod watchlist;

pub use auth::{AuthError, AuthSession, Claims, HttpIdentityProvider, IdentityProvider};
pub use catalog::{
    CatalogError, CatalogService, HttpCatalog, ListRequest, MoviePayload, MovieSummary,
    ResultPage,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use error::FetchError;
pub use external_catalog::{ExternalCandidate, ExternalCatalog, ExternalCatalogError, TmdbClient};
pub use fallback::{should_offer_external, ImportPanel, PanelState};
pub use filter::{FilterState, FilterUpdate, HistoryMode, Location};
pub use http::{ApiClient, HttpError};
pub use listing::{CatalogListView, ViewSnapshot};
pub use query::{classify, QueryDescriptor, QueryField};
pub use search::{ResultFetcher, SearchOutcome, SearchResults};
pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};
