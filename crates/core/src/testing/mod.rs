//! Testing utilities and mock implementations.
//!
//! Mocks of every service trait the client talks to, so views and managers
//! can be exercised without a running catalog service.
//!
//! # Example
//!
//! ```rust,ignore
//! use filmoteca_core::testing::{fixtures, MockCatalog};
//! use filmoteca_core::search::ResultFetcher;
//!
//! let catalog = Arc::new(MockCatalog::new());
//! catalog.set_movies(fixtures::movies(30)).await;
//! catalog.set_list_delay("acción", Duration::from_millis(50)).await;
//!
//! let fetcher = ResultFetcher::new(catalog.clone(), 12);
//! ```

mod mock_catalog;
mod mock_external_catalog;
mod mock_identity;
mod mock_services;

pub use mock_catalog::{MockCatalog, RecordedCatalogCall};
pub use mock_external_catalog::{MockExternalCatalog, RecordedCatalogQuery};
pub use mock_identity::MockIdentityProvider;
pub use mock_services::{MockProfileService, MockWatchlistService};

/// Test fixtures and helper functions.
pub mod fixtures {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use crate::catalog::MovieSummary;
    use crate::external_catalog::{ExternalCandidate, ProviderId};
    use crate::filter::FilterState;
    use crate::query::CANONICAL_GENRES;

    /// Create a catalog movie with the given genres.
    pub fn movie(id: &str, title: &str, year: i32, genres: &[&str]) -> MovieSummary {
        MovieSummary {
            id: id.to_string(),
            title: title.to_string(),
            year: Some(year),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            age_rating: Some("PG-13".to_string()),
            ..Default::default()
        }
    }

    /// `count` movies titled "Película N", cycling through the genre list.
    pub fn movies(count: usize) -> Vec<MovieSummary> {
        (1..=count)
            .map(|i| {
                let genre = CANONICAL_GENRES[(i - 1) % CANONICAL_GENRES.len()];
                movie(
                    &format!("m{}", i),
                    &format!("Película {}", i),
                    1980 + (i % 40) as i32,
                    &[genre],
                )
            })
            .collect()
    }

    /// Create an importable external candidate.
    pub fn candidate(id: &str, title: &str, year: i32) -> ExternalCandidate {
        ExternalCandidate {
            provider_id: Some(ProviderId::new(id)),
            title: title.to_string(),
            year: Some(year),
            poster: Some(format!("/{}.jpg", id)),
            age_rating: None,
            adult: false,
        }
    }

    /// Filter state with only a genre set, on page 1.
    pub fn filter_with_genre(genre: &str) -> FilterState {
        FilterState {
            genre: genre.to_string(),
            ..Default::default()
        }
    }

    /// Unsigned JWT whose payload carries `sub`, `role` and `exp`.
    pub fn jwt(sub: &str, role: &str, exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::json!({
            "sub": sub,
            "email": format!("{}@example.com", sub),
            "role": role,
            "exp": exp,
        });
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, payload)
    }
}
