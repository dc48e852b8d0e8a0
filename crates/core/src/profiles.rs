//! Viewer profiles and the active-profile selection.
//!
//! Profiles live on the catalog service. The selected one is written to the
//! session store and read synchronously by every catalog-affecting view; kid
//! profiles get a filtered catalog from the service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::http::{read_json, ApiClient, HttpError};
use crate::session::SessionStore;

const PROFILES_PATH: &str = "profiles";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Adult,
    Kid,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Adult => "adult",
            ProfileKind::Kid => "kid",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adult" => Ok(ProfileKind::Adult),
            "kid" | "kids" | "child" => Ok(ProfileKind::Kid),
            other => Err(FetchError::Validation(format!(
                "Unknown profile type '{}', expected adult or kid",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProfileKind,
}

/// Body for creating or editing a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProfileKind,
}

impl ProfileDraft {
    pub fn new(name: impl Into<String>, kind: ProfileKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Trimmed copy; a blank name is rejected.
    pub fn validated(&self) -> Result<Self, FetchError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FetchError::Validation("Profile name is required".to_string()));
        }
        Ok(Self::new(name, self.kind))
    }
}

/// The selected profile as kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveProfile {
    pub id: String,
    pub name: String,
}

impl From<&Profile> for ActiveProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
        }
    }
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn list(&self) -> Result<Vec<Profile>, HttpError>;
    async fn create(&self, draft: &ProfileDraft) -> Result<Profile, HttpError>;
    async fn update(&self, id: &str, draft: &ProfileDraft) -> Result<Profile, HttpError>;
    async fn remove(&self, id: &str) -> Result<(), HttpError>;
}

/// Profile endpoints of the catalog service.
#[derive(Debug, Clone)]
pub struct HttpProfileService {
    api: ApiClient,
}

impl HttpProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn profile_path(id: &str) -> String {
        format!("{}/{}", PROFILES_PATH, urlencoding::encode(id))
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn list(&self) -> Result<Vec<Profile>, HttpError> {
        let response = self.api.get(PROFILES_PATH, &[]).await?;
        read_json(response).await
    }

    async fn create(&self, draft: &ProfileDraft) -> Result<Profile, HttpError> {
        let response = self.api.post_json(PROFILES_PATH, draft).await?;
        read_json(response).await
    }

    async fn update(&self, id: &str, draft: &ProfileDraft) -> Result<Profile, HttpError> {
        let response = self.api.put_json(&Self::profile_path(id), draft).await?;
        read_json(response).await
    }

    async fn remove(&self, id: &str) -> Result<(), HttpError> {
        self.api.delete(&Self::profile_path(id)).await?;
        Ok(())
    }
}

/// Profile operations plus active-profile bookkeeping.
pub struct ProfileManager {
    service: Arc<dyn ProfileService>,
    store: Arc<dyn SessionStore>,
}

impl ProfileManager {
    pub fn new(service: Arc<dyn ProfileService>, store: Arc<dyn SessionStore>) -> Self {
        Self { service, store }
    }

    /// Currently selected profile, read from the session.
    pub fn active(&self) -> Result<Option<ActiveProfile>, FetchError> {
        Ok(self.store.load()?.active_profile)
    }

    pub async fn list(&self) -> Result<Vec<Profile>, FetchError> {
        Ok(self.service.list().await?)
    }

    pub async fn create(&self, draft: &ProfileDraft) -> Result<Profile, FetchError> {
        let draft = draft.validated()?;
        let profile = self.service.create(&draft).await?;
        info!(id = %profile.id, name = %profile.name, "Profile created");
        Ok(profile)
    }

    /// Edit a profile. Renaming the active profile updates the stored name.
    pub async fn update(&self, id: &str, draft: &ProfileDraft) -> Result<Profile, FetchError> {
        let draft = draft.validated()?;
        let profile = self.service.update(id, &draft).await?;
        self.store.update(&mut |data| {
            if let Some(active) = data.active_profile.as_mut() {
                if active.id == profile.id {
                    active.name = profile.name.clone();
                }
            }
        })?;
        Ok(profile)
    }

    /// Delete a profile. Deleting the active profile clears the selection.
    pub async fn remove(&self, id: &str) -> Result<(), FetchError> {
        self.service.remove(id).await?;
        let mut cleared = false;
        self.store.update(&mut |data| {
            if data.active_profile.as_ref().is_some_and(|p| p.id == id) {
                data.active_profile = None;
                cleared = true;
            }
        })?;
        if cleared {
            info!(id = %id, "Active profile deleted, selection cleared");
        }
        Ok(())
    }

    /// Make `profile` the active one.
    pub fn select(&self, profile: &Profile) -> Result<ActiveProfile, FetchError> {
        let active = ActiveProfile::from(profile);
        self.store
            .update(&mut |data| data.active_profile = Some(active.clone()))?;
        debug!(id = %active.id, "Profile selected");
        Ok(active)
    }

    /// Select by id or (case-insensitive) name.
    pub async fn select_by(&self, key: &str) -> Result<ActiveProfile, FetchError> {
        let key = key.trim();
        let profiles = self.list().await?;
        let profile = profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| profiles.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
            .ok_or_else(|| FetchError::NotFound(format!("profile {}", key)))?;
        self.select(profile)
    }
}
