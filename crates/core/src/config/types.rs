use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Catalog service connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the catalog REST service (e.g., "http://localhost:4000")
    pub base_url: String,
    /// Request timeout in seconds (default: 12)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Items per catalog page (default: 12)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout() -> u64 {
    12
}

fn default_page_size() -> u32 {
    12
}

/// Where the session (token, active profile, favorites) is kept
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("filmoteca-session.json")
}

/// Image URL resolution
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Image proxy used for catalog posters
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// TMDB image base for relative poster paths
    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_base_url: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            tmdb_base_url: default_tmdb_image_base(),
        }
    }
}

fn default_proxy_url() -> String {
    "https://images.weserv.nl/".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

/// Config as shown to the user, with session state summarized
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: ApiConfig,
    pub session: SanitizedSessionConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSessionConfig {
    pub path: PathBuf,
    pub token_present: bool,
}

impl SanitizedConfig {
    pub fn new(config: &Config, token_present: bool) -> Self {
        Self {
            api: config.api.clone(),
            session: SanitizedSessionConfig {
                path: config.session.path.clone(),
                token_present,
            },
            images: config.images.clone(),
        }
    }
}
