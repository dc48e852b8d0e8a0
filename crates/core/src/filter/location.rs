//! Shared, navigable location holding the encoded filter state.
//!
//! This is the single source of truth for the catalog-list filters. Every
//! reader decodes from it, every writer goes through [`Location::apply`],
//! which does read-modify-write under one lock so concurrent updates to
//! different fields never overwrite each other.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use super::state::{decode, encode, FilterState, FilterUpdate, HistoryMode};

/// Result of applying an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Encoded query after the update.
    pub query: String,
    /// Decoded filters after the update.
    pub filter: FilterState,
    /// How the change was recorded.
    pub mode: HistoryMode,
    /// False when the update left the encoding as it was.
    pub changed: bool,
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    fn current(&self) -> &str {
        &self.entries[self.index]
    }

    fn record(&mut self, query: String, mode: HistoryMode) {
        match mode {
            HistoryMode::Push => {
                self.entries.truncate(self.index + 1);
                self.entries.push(query);
                self.index = self.entries.len() - 1;
            }
            HistoryMode::Replace => {
                self.entries[self.index] = query;
            }
        }
    }
}

/// Cloneable handle to the current location and its history.
#[derive(Debug, Clone)]
pub struct Location {
    history: Arc<RwLock<History>>,
    notifier: Arc<watch::Sender<String>>,
}

impl Default for Location {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location {
    /// Start at `initial` (as found, e.g., in a link or a saved session).
    ///
    /// The query is stored in its canonical encoding.
    pub fn new(initial: &str) -> Self {
        let initial = normalize(initial);
        let (notifier, _) = watch::channel(initial.clone());
        Self {
            history: Arc::new(RwLock::new(History {
                entries: vec![initial],
                index: 0,
            })),
            notifier: Arc::new(notifier),
        }
    }

    /// Current encoded query.
    pub async fn query(&self) -> String {
        self.history.read().await.current().to_string()
    }

    /// Current filters, decoded from the location.
    pub async fn filter(&self) -> FilterState {
        decode(self.history.read().await.current())
    }

    /// Apply a partial update against the latest state.
    pub async fn apply(&self, update: &FilterUpdate) -> Navigation {
        let mut history = self.history.write().await;

        let current = decode(history.current());
        let next = update.apply_to(&current);
        let query = encode(&next);
        let mode = update.history_mode();
        let changed = query != history.current();

        if changed {
            history.record(query.clone(), mode);
            self.notifier.send_replace(query.clone());
            info!(query = %query, ?mode, "Location updated");
        } else {
            debug!(query = %query, "Location unchanged");
        }

        Navigation {
            query,
            filter: next,
            mode,
            changed,
        }
    }

    /// Navigate to a raw query string (e.g., a pasted link).
    ///
    /// Empty or malformed keys are dropped before the entry is recorded.
    pub async fn navigate(&self, query: &str, mode: HistoryMode) {
        let query = normalize(query);
        let mut history = self.history.write().await;
        if history.current() == query {
            return;
        }
        history.record(query.clone(), mode);
        self.notifier.send_replace(query);
    }

    /// Go one entry back. Returns the new query, or `None` at the start.
    pub async fn back(&self) -> Option<String> {
        let mut history = self.history.write().await;
        if history.index == 0 {
            return None;
        }
        history.index -= 1;
        let query = history.current().to_string();
        self.notifier.send_replace(query.clone());
        Some(query)
    }

    /// Go one entry forward. Returns the new query, or `None` at the end.
    pub async fn forward(&self) -> Option<String> {
        let mut history = self.history.write().await;
        if history.index + 1 >= history.entries.len() {
            return None;
        }
        history.index += 1;
        let query = history.current().to_string();
        self.notifier.send_replace(query.clone());
        Some(query)
    }

    /// Number of history entries.
    pub async fn history_len(&self) -> usize {
        self.history.read().await.entries.len()
    }

    /// Receive every change of the location, including back/forward.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.notifier.subscribe()
    }
}

fn normalize(query: &str) -> String {
    encode(&decode(query))
}
