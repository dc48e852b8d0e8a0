//! Catalog-list filter state and its shareable query-string encoding.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;
use crate::query::is_year;

pub const KEY_SEARCH: &str = "search";
pub const KEY_GENRE: &str = "genre";
pub const KEY_YEAR: &str = "year";
pub const KEY_PAGE: &str = "page";

/// Filters of the catalog-list view.
///
/// Empty strings mean "unset". `page` is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub genre: String,
    pub year: String,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            genre: String::new(),
            year: String::new(),
            page: 1,
        }
    }
}

impl FilterState {
    /// True when no search, genre or year filter is set.
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.genre.is_empty() && self.year.is_empty()
    }

    /// Trimmed free-text term, if any.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

/// How a navigation is recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// New history entry (fresh filter submission).
    Push,
    /// Overwrite the current entry (paging through results).
    Replace,
}

/// A partial change to the filters.
///
/// `None` leaves a field untouched; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub page: Option<u32>,
}

impl FilterUpdate {
    pub fn search(value: impl Into<String>) -> Self {
        Self {
            search: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn genre(value: impl Into<String>) -> Self {
        Self {
            genre: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn year(value: impl Into<String>) -> Self {
        Self {
            year: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    /// Clear every filter and go back to page 1.
    pub fn clear_all() -> Self {
        Self {
            search: Some(String::new()),
            genre: Some(String::new()),
            year: Some(String::new()),
            page: None,
        }
    }

    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    pub fn with_genre(mut self, value: impl Into<String>) -> Self {
        self.genre = Some(value.into());
        self
    }

    pub fn with_year(mut self, value: impl Into<String>) -> Self {
        self.year = Some(value.into());
        self
    }

    /// Whether any of search/genre/year is part of this update.
    pub fn touches_filters(&self) -> bool {
        self.search.is_some() || self.genre.is_some() || self.year.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_filters() && self.page.is_none()
    }

    /// Filter submissions get their own history entry; paging replaces.
    pub fn history_mode(&self) -> HistoryMode {
        if self.touches_filters() {
            HistoryMode::Push
        } else {
            HistoryMode::Replace
        }
    }

    /// Reject values that can never be sent to the catalog.
    pub fn validate(&self) -> Result<(), FetchError> {
        if let Some(year) = &self.year {
            let year = year.trim();
            if !year.is_empty() && !is_year(year) {
                return Err(FetchError::Validation(format!(
                    "Year must have 4 digits (e.g. 2023), got '{}'",
                    year
                )));
            }
        }
        if self.page == Some(0) {
            return Err(FetchError::Validation("Page must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Apply on top of `current`. Filter changes reset the page to 1.
    pub fn apply_to(&self, current: &FilterState) -> FilterState {
        let mut next = current.clone();

        if let Some(search) = &self.search {
            next.search = search.trim().to_string();
        }
        if let Some(genre) = &self.genre {
            next.genre = genre.trim().to_string();
        }
        if let Some(year) = &self.year {
            next.year = year.trim().to_string();
        }

        if self.touches_filters() {
            next.page = 1;
        } else if let Some(page) = self.page {
            next.page = page.max(1);
        }

        next
    }
}

/// Encode filters as a query string (no leading `?`).
///
/// Values are trimmed; blank keys and a malformed `year` are omitted, as
/// [`decode`] would drop them. `page` is omitted when it is 1.
pub fn encode(state: &FilterState) -> String {
    let mut pairs = Vec::with_capacity(4);

    for (key, value) in [
        (KEY_SEARCH, state.search.trim()),
        (KEY_GENRE, state.genre.trim()),
        (KEY_YEAR, state.year.trim()),
    ] {
        if value.is_empty() || (key == KEY_YEAR && !is_year(value)) {
            continue;
        }
        pairs.push(format!("{}={}", key, urlencoding::encode(value)));
    }

    if state.page > 1 {
        pairs.push(format!("{}={}", KEY_PAGE, state.page));
    }

    pairs.join("&")
}

/// Decode a query string into filters. Missing keys take their defaults.
///
/// Unknown keys are ignored. A malformed `year` or `page` is treated as unset.
pub fn decode(query: &str) -> FilterState {
    let mut state = FilterState::default();

    for pair in query.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode_component(raw_value);
        let value = value.trim();

        match key {
            KEY_SEARCH => state.search = value.to_string(),
            KEY_GENRE => state.genre = value.to_string(),
            KEY_YEAR => {
                if value.is_empty() || is_year(value) {
                    state.year = value.to_string();
                } else {
                    debug!(year = value, "Ignoring malformed year in location");
                }
            }
            KEY_PAGE => {
                state.page = value.parse::<u32>().ok().filter(|p| *p >= 1).unwrap_or(1);
            }
            _ => {}
        }
    }

    state
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(value) => value.into_owned(),
        Err(_) => spaced,
    }
}
