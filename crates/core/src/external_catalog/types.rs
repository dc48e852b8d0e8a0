//! Types for external catalog responses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::MovieSummary;

/// Identifier in the external provider's id space (TMDB id).
///
/// Not comparable with local catalog ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A search hit from the external provider, ready for one-click import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCandidate")]
pub struct ExternalCandidate {
    /// Provider id; `None` when the provider row carried no usable id.
    #[serde(rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "ageRating", skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<String>,
    pub adult: bool,
}

impl ExternalCandidate {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Rating label, or "Adults only" for unrated adult titles.
    pub fn rating_label(&self) -> Option<&str> {
        match (&self.age_rating, self.adult) {
            (Some(rating), _) => Some(rating),
            (None, true) => Some("Adults only"),
            (None, false) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearValue {
    Number(i64),
    Text(String),
}

impl YearValue {
    fn as_year(&self) -> Option<i32> {
        match self {
            YearValue::Number(n) => i32::try_from(*n).ok(),
            YearValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    tmdb_id: Option<IdValue>,
    id: Option<IdValue>,
    provider_id: Option<String>,
    title: Option<String>,
    name: Option<String>,
    year: Option<YearValue>,
    #[serde(rename = "release_year")]
    release_year: Option<YearValue>,
    #[serde(rename = "release_date")]
    release_date: Option<String>,
    poster: Option<String>,
    #[serde(rename = "poster_path")]
    poster_path: Option<String>,
    image: Option<String>,
    age_rating: Option<String>,
    certification: Option<String>,
    #[serde(default)]
    adult: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<RawCandidate> for ExternalCandidate {
    fn from(raw: RawCandidate) -> Self {
        let provider_id = raw
            .tmdb_id
            .or(raw.id)
            .map(|id| match id {
                IdValue::Number(n) => n.to_string(),
                IdValue::Text(s) => s,
            })
            .or(raw.provider_id)
            .filter(|s| !s.trim().is_empty())
            .map(ProviderId);

        let year = raw
            .year
            .as_ref()
            .and_then(YearValue::as_year)
            .or_else(|| raw.release_year.as_ref().and_then(YearValue::as_year))
            .or_else(|| {
                raw.release_date
                    .as_deref()
                    .and_then(|d| d.get(..4))
                    .and_then(|y| y.parse().ok())
            });

        Self {
            provider_id,
            title: non_empty(raw.title)
                .or_else(|| non_empty(raw.name))
                .unwrap_or_default(),
            year,
            poster: non_empty(raw.poster)
                .or_else(|| non_empty(raw.poster_path))
                .or_else(|| non_empty(raw.image)),
            age_rating: non_empty(raw.age_rating).or_else(|| non_empty(raw.certification)),
            adult: raw.adult.unwrap_or(false),
        }
    }
}

/// Search response: a bare array or a `{ results: [...] }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchBody {
    Bare(Vec<ExternalCandidate>),
    Envelope {
        #[serde(default)]
        results: Vec<ExternalCandidate>,
    },
}

impl SearchBody {
    pub(crate) fn into_candidates(self) -> Vec<ExternalCandidate> {
        match self {
            SearchBody::Bare(list) => list,
            SearchBody::Envelope { results } => results,
        }
    }
}

/// Import response: the created movie, possibly wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ImportBody {
    Wrapped { movie: MovieSummary },
    Plain(MovieSummary),
}

impl ImportBody {
    pub(crate) fn into_movie(self) -> MovieSummary {
        match self {
            ImportBody::Wrapped { movie } => movie,
            ImportBody::Plain(movie) => movie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(value: serde_json::Value) -> ExternalCandidate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tmdb_style_row() {
        let c = candidate(json!({
            "id": 603,
            "title": "The Matrix",
            "release_date": "1999-03-30",
            "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
            "adult": false
        }));
        assert_eq!(c.provider_id, Some(ProviderId::new("603")));
        assert_eq!(c.year, Some(1999));
        assert_eq!(c.poster.as_deref(), Some("/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg"));
        assert_eq!(c.rating_label(), None);
    }

    #[test]
    fn test_backend_style_row() {
        let c = candidate(json!({
            "tmdbId": 27205,
            "id": "ignored",
            "name": "Inception",
            "year": 2010,
            "certification": "PG-13"
        }));
        assert_eq!(c.provider_id.as_ref().map(ProviderId::as_str), Some("27205"));
        assert_eq!(c.title, "Inception");
        assert_eq!(c.rating_label(), Some("PG-13"));
    }

    #[test]
    fn test_missing_id_and_adult_label() {
        let c = candidate(json!({ "title": "", "adult": true, "release_year": "1975" }));
        assert!(c.provider_id.is_none());
        assert_eq!(c.display_title(), "Untitled");
        assert_eq!(c.year, Some(1975));
        assert_eq!(c.rating_label(), Some("Adults only"));
    }

    #[test]
    fn test_search_body_shapes() {
        let bare: SearchBody = serde_json::from_value(json!([{"id": 1, "title": "A"}])).unwrap();
        assert_eq!(bare.into_candidates().len(), 1);

        let env: SearchBody =
            serde_json::from_value(json!({"results": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(env.into_candidates().len(), 2);
    }

    #[test]
    fn test_import_body_shapes() {
        let wrapped: ImportBody =
            serde_json::from_value(json!({"movie": {"_id": "x", "title": "Alien"}})).unwrap();
        assert_eq!(wrapped.into_movie().title, "Alien");

        let plain: ImportBody =
            serde_json::from_value(json!({"_id": "y", "title": "Aliens"})).unwrap();
        assert_eq!(plain.into_movie().id, "y");
    }
}
