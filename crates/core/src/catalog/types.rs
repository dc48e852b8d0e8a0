//! Types for the catalog service.

use serde::{Deserialize, Serialize};

use crate::filter::FilterState;

/// A catalog entry as shown in lists and detail views.
///
/// The service has used two field naming schemes over time (`title`/`titulo`,
/// `year`/`año`, `genres`/`genero`, `poster`/`imagen`, `overview`/`descripcion`,
/// `_id`/`id`). Deserialization resolves them once: the current name wins and
/// the legacy name is used only when the current one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMovie")]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(rename = "ageRating", skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl MovieSummary {
    /// Title for display, with a placeholder for untitled entries.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// "1999 · Action / Sci-Fi · PG-13" style subtitle.
    pub fn subtitle(&self) -> String {
        let mut parts = Vec::new();
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        if !self.genres.is_empty() {
            parts.push(self.genres.join(" / "));
        }
        if let Some(rating) = &self.age_rating {
            parts.push(rating.clone());
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => Some(*n),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_year(&self) -> Option<i32> {
        self.as_f64()
            .filter(|y| y.fract() == 0.0 && *y > 0.0 && *y < 10_000.0)
            .map(|y| y as i32)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenresValue {
    List(Vec<String>),
    Text(String),
}

/// Wire form accepting both naming schemes.
#[derive(Debug, Deserialize)]
struct RawMovie {
    #[serde(rename = "_id")]
    object_id: Option<IdValue>,
    id: Option<IdValue>,
    title: Option<String>,
    titulo: Option<String>,
    year: Option<NumberOrText>,
    #[serde(rename = "año")]
    legacy_year: Option<NumberOrText>,
    genres: Option<GenresValue>,
    genero: Option<String>,
    #[serde(rename = "ageRating")]
    age_rating: Option<String>,
    overview: Option<String>,
    descripcion: Option<String>,
    poster: Option<String>,
    imagen: Option<String>,
    director: Option<String>,
    rating: Option<NumberOrText>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn split_genres(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<RawMovie> for MovieSummary {
    fn from(raw: RawMovie) -> Self {
        let genres = match raw.genres {
            Some(GenresValue::List(list)) if !list.is_empty() => list
                .into_iter()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect(),
            Some(GenresValue::Text(text)) if !text.trim().is_empty() => split_genres(&text),
            _ => raw.genero.as_deref().map(split_genres).unwrap_or_default(),
        };

        Self {
            id: raw
                .object_id
                .or(raw.id)
                .map(IdValue::into_string)
                .unwrap_or_default(),
            title: non_empty(raw.title)
                .or_else(|| non_empty(raw.titulo))
                .unwrap_or_default(),
            year: raw
                .year
                .as_ref()
                .and_then(NumberOrText::as_year)
                .or_else(|| raw.legacy_year.as_ref().and_then(NumberOrText::as_year)),
            genres,
            age_rating: non_empty(raw.age_rating),
            overview: non_empty(raw.overview).or_else(|| non_empty(raw.descripcion)),
            poster: non_empty(raw.poster).or_else(|| non_empty(raw.imagen)),
            director: non_empty(raw.director),
            rating: raw.rating.as_ref().and_then(NumberOrText::as_f64).map(|r| r as f32),
        }
    }
}

/// One page of the catalog list. Replaced as a whole on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub items: Vec<MovieSummary>,
    pub page: u32,
    pub total_pages: u32,
    pub total_docs: u64,
}

impl ResultPage {
    /// Empty first page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
            total_docs: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Paginated envelope returned by the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageEnvelope {
    #[serde(default)]
    docs: Vec<MovieSummary>,
    page: Option<u32>,
    total_pages: Option<u32>,
    total_docs: Option<u64>,
}

/// Either a bare array or the paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody {
    Bare(Vec<MovieSummary>),
    Envelope(PageEnvelope),
}

impl ListBody {
    pub(crate) fn into_page(self) -> ResultPage {
        match self {
            ListBody::Bare(items) => {
                let total_docs = items.len() as u64;
                ResultPage {
                    items,
                    page: 1,
                    total_pages: 1,
                    total_docs,
                }
            }
            ListBody::Envelope(env) => ResultPage {
                items: env.docs,
                page: env.page.unwrap_or(1),
                total_pages: env.total_pages.unwrap_or(1),
                total_docs: env.total_docs.unwrap_or(0),
            },
        }
    }

    pub(crate) fn into_items(self) -> Vec<MovieSummary> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Envelope(env) => env.docs,
        }
    }
}

/// Parameters of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub filter: FilterState,
    pub limit: u32,
    /// Active profile; the service hides adult titles from kid profiles.
    pub profile_id: Option<String>,
}

impl ListRequest {
    /// Query parameters, omitting unset filters.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.filter.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(profile_id) = &self.profile_id {
            params.push(("profileId", profile_id.clone()));
        }
        for (key, value) in [
            ("search", &self.filter.search),
            ("genre", &self.filter.genre),
            ("year", &self.filter.year),
        ] {
            if !value.is_empty() {
                params.push((key, value.clone()));
            }
        }
        params
    }
}

/// Body for creating or updating a movie. Legacy field names are never sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}
