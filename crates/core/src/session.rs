//! Locally persisted client state.
//!
//! Holds what the browser client kept in local storage: the auth token, the
//! active profile, the favorites list and the last catalog-list location.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::MovieSummary;
use crate::profiles::ActiveProfile;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<ActiveProfile>,
    #[serde(default)]
    pub favorites: Vec<MovieSummary>,
    /// Encoded catalog-list location (query string without `?`).
    #[serde(default)]
    pub location: String,
}

/// Storage for [`SessionData`].
///
/// `update` is a read-modify-write against the latest stored data.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SessionData, SessionError>;

    fn save(&self, data: &SessionData) -> Result<(), SessionError>;

    fn update(
        &self,
        apply: &mut dyn FnMut(&mut SessionData),
    ) -> Result<SessionData, SessionError> {
        let mut data = self.load()?;
        apply(&mut data);
        self.save(&data)?;
        Ok(data)
    }
}

/// JSON file store. A missing file reads as an empty session.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<SessionData, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(SessionData::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionData::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionData, SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read()
    }

    fn save(&self, data: &SessionData) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write(data)
    }

    fn update(
        &self,
        apply: &mut dyn FnMut(&mut SessionData),
    ) -> Result<SessionData, SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut data = self.read()?;
        apply(&mut data);
        self.write(&data)?;
        Ok(data)
    }
}

/// In-memory store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: Mutex<SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: SessionData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionData, SessionError> {
        Ok(self.data.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, data: &SessionData) -> Result<(), SessionError> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = data.clone();
        Ok(())
    }

    fn update(
        &self,
        apply: &mut dyn FnMut(&mut SessionData),
    ) -> Result<SessionData, SessionError> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        apply(&mut data);
        Ok(data.clone())
    }
}
