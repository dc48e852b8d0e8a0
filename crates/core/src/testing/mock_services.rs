//! Mock profile and watchlist services for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::http::HttpError;
use crate::profiles::{Profile, ProfileDraft, ProfileService};
use crate::watchlist::{WatchlistEntry, WatchlistMovie, WatchlistService};

fn not_found(what: &str) -> HttpError {
    HttpError::Status {
        status: 404,
        message: format!("{} not found", what),
    }
}

/// In-memory ProfileService.
#[derive(Debug, Default)]
pub struct MockProfileService {
    profiles: Arc<RwLock<Vec<Profile>>>,
    calls: Arc<RwLock<Vec<String>>>,
    next_id: AtomicU64,
}

impl MockProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn record(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ProfileService for MockProfileService {
    async fn list(&self) -> Result<Vec<Profile>, HttpError> {
        self.record("list".to_string()).await;
        Ok(self.profiles.read().await.clone())
    }

    async fn create(&self, draft: &ProfileDraft) -> Result<Profile, HttpError> {
        self.record(format!("create:{}", draft.name)).await;
        let profile = Profile {
            id: format!("profile-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            name: draft.name.clone(),
            kind: draft.kind,
        };
        self.profiles.write().await.push(profile.clone());
        Ok(profile)
    }

    async fn update(&self, id: &str, draft: &ProfileDraft) -> Result<Profile, HttpError> {
        self.record(format!("update:{}", id)).await;
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("Profile"))?;
        profile.name = draft.name.clone();
        profile.kind = draft.kind;
        Ok(profile.clone())
    }

    async fn remove(&self, id: &str) -> Result<(), HttpError> {
        self.record(format!("remove:{}", id)).await;
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            return Err(not_found("Profile"));
        }
        Ok(())
    }
}

/// In-memory WatchlistService. Entries reference movies by id only.
#[derive(Debug, Default)]
pub struct MockWatchlistService {
    entries: Arc<RwLock<Vec<(String, WatchlistEntry)>>>,
    calls: Arc<RwLock<Vec<String>>>,
    next_id: AtomicU64,
}

impl MockWatchlistService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    async fn record(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl WatchlistService for MockWatchlistService {
    async fn list(&self, profile_id: &str) -> Result<Vec<WatchlistEntry>, HttpError> {
        self.record(format!("list:{}", profile_id)).await;
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|(owner, _)| owner == profile_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn add(&self, profile_id: &str, movie_id: &str) -> Result<(), HttpError> {
        self.record(format!("add:{}:{}", profile_id, movie_id)).await;
        let mut entries = self.entries.write().await;
        if entries
            .iter()
            .any(|(owner, e)| owner == profile_id && e.movie.id() == movie_id)
        {
            return Err(HttpError::Status {
                status: 409,
                message: "Already in watchlist".to_string(),
            });
        }
        let entry = WatchlistEntry {
            id: format!("watch-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            movie: WatchlistMovie::Id(movie_id.to_string()),
        };
        entries.push((profile_id.to_string(), entry));
        Ok(())
    }

    async fn remove(&self, entry_id: &str) -> Result<(), HttpError> {
        self.record(format!("remove:{}", entry_id)).await;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(_, e)| e.id != entry_id);
        if entries.len() == before {
            return Err(not_found("Watchlist entry"));
        }
        Ok(())
    }
}
