//! Per-profile watchlist.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::MovieSummary;
use crate::error::FetchError;
use crate::http::{read_json, ApiClient, HttpError};
use crate::session::SessionStore;

const WATCHLIST_PATH: &str = "watchlist";

/// The movie reference of a watchlist entry: an id, or the populated movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WatchlistMovie {
    Populated(MovieSummary),
    Id(String),
}

impl WatchlistMovie {
    pub fn id(&self) -> &str {
        match self {
            WatchlistMovie::Populated(movie) => &movie.id,
            WatchlistMovie::Id(id) => id,
        }
    }

    pub fn movie(&self) -> Option<&MovieSummary> {
        match self {
            WatchlistMovie::Populated(movie) => Some(movie),
            WatchlistMovie::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "movieId")]
    pub movie: WatchlistMovie,
}

impl WatchlistEntry {
    pub fn title(&self) -> &str {
        self.movie
            .movie()
            .map(MovieSummary::display_title)
            .unwrap_or("Untitled")
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WatchlistBody {
    Envelope {
        #[serde(default)]
        docs: Vec<WatchlistEntry>,
    },
    Bare(Vec<WatchlistEntry>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest<'a> {
    profile_id: &'a str,
    movie_id: &'a str,
}

#[async_trait]
pub trait WatchlistService: Send + Sync {
    async fn list(&self, profile_id: &str) -> Result<Vec<WatchlistEntry>, HttpError>;
    async fn add(&self, profile_id: &str, movie_id: &str) -> Result<(), HttpError>;
    async fn remove(&self, entry_id: &str) -> Result<(), HttpError>;
}

/// Watchlist endpoints of the catalog service.
#[derive(Debug, Clone)]
pub struct HttpWatchlistService {
    api: ApiClient,
}

impl HttpWatchlistService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WatchlistService for HttpWatchlistService {
    async fn list(&self, profile_id: &str) -> Result<Vec<WatchlistEntry>, HttpError> {
        let response = match self
            .api
            .get(WATCHLIST_PATH, &[("profileId", profile_id.to_string())])
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let body: WatchlistBody = read_json(response).await?;
        Ok(match body {
            WatchlistBody::Envelope { docs } => docs,
            WatchlistBody::Bare(docs) => docs,
        })
    }

    async fn add(&self, profile_id: &str, movie_id: &str) -> Result<(), HttpError> {
        self.api
            .post_json(
                WATCHLIST_PATH,
                &AddRequest {
                    profile_id,
                    movie_id,
                },
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, entry_id: &str) -> Result<(), HttpError> {
        let path = format!("{}/{}", WATCHLIST_PATH, urlencoding::encode(entry_id));
        self.api.delete(&path).await?;
        Ok(())
    }
}

/// Watchlist of the active profile.
pub struct WatchlistManager {
    service: Arc<dyn WatchlistService>,
    store: Arc<dyn SessionStore>,
}

impl WatchlistManager {
    pub fn new(service: Arc<dyn WatchlistService>, store: Arc<dyn SessionStore>) -> Self {
        Self { service, store }
    }

    fn profile_id(&self) -> Result<String, FetchError> {
        self.store
            .load()?
            .active_profile
            .map(|p| p.id)
            .ok_or_else(|| FetchError::Validation("Choose a profile first".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<WatchlistEntry>, FetchError> {
        let profile_id = self.profile_id()?;
        Ok(self.service.list(&profile_id).await?)
    }

    pub async fn add(&self, movie_id: &str) -> Result<(), FetchError> {
        let movie_id = movie_id.trim();
        if movie_id.is_empty() {
            return Err(FetchError::Validation("Movie id is required".to_string()));
        }
        let profile_id = self.profile_id()?;
        self.service.add(&profile_id, movie_id).await?;
        info!(profile = %profile_id, movie = %movie_id, "Added to watchlist");
        Ok(())
    }

    pub async fn remove(&self, entry_id: &str) -> Result<(), FetchError> {
        self.profile_id()?;
        self.service.remove(entry_id).await?;
        info!(entry = %entry_id, "Removed from watchlist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::ActiveProfile;
    use crate::session::{MemorySessionStore, SessionData};
    use crate::testing::MockWatchlistService;
    use serde_json::json;

    fn store_with_profile() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::with_data(SessionData {
            active_profile: Some(ActiveProfile {
                id: "p1".to_string(),
                name: "Ana".to_string(),
            }),
            ..Default::default()
        }))
    }

    #[test]
    fn test_entry_shapes() {
        let body: WatchlistBody = serde_json::from_value(json!({
            "docs": [
                {"_id": "w1", "movieId": {"_id": "m1", "title": "Alien", "year": 1979, "ageRating": "R"}},
                {"_id": "w2", "movieId": "m2"}
            ]
        }))
        .unwrap();
        let WatchlistBody::Envelope { docs } = body else {
            panic!("expected envelope");
        };

        assert_eq!(docs[0].title(), "Alien");
        assert_eq!(docs[0].movie.id(), "m1");
        assert_eq!(docs[1].movie, WatchlistMovie::Id("m2".to_string()));
        assert_eq!(docs[1].title(), "Untitled");
    }

    #[test]
    fn test_add_request_body() {
        let body = serde_json::to_value(AddRequest {
            profile_id: "p1",
            movie_id: "m1",
        })
        .unwrap();
        assert_eq!(body, json!({"profileId": "p1", "movieId": "m1"}));
    }

    #[tokio::test]
    async fn test_requires_active_profile() {
        let service = Arc::new(MockWatchlistService::new());
        let manager = WatchlistManager::new(service.clone(), Arc::new(MemorySessionStore::new()));

        assert!(matches!(manager.add("m1").await, Err(FetchError::Validation(_))));
        assert!(matches!(manager.list().await, Err(FetchError::Validation(_))));
        assert_eq!(service.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let service = Arc::new(MockWatchlistService::new());
        let manager = WatchlistManager::new(service.clone(), store_with_profile());

        manager.add("m1").await.unwrap();
        manager.add("m2").await.unwrap();
        let entries = manager.list().await.unwrap();
        assert_eq!(entries.len(), 2);

        manager.remove(&entries[0].id).await.unwrap();
        assert_eq!(manager.list().await.unwrap().len(), 1);
    }
}
