//! TMDB client.
//!
//! The catalog service proxies TMDB, so no API key is held here. Search goes
//! through `GET /tmdb/search` and import through `POST /tmdb/import/{id}`.

use async_trait::async_trait;
use tracing::debug;

use super::types::{ExternalCandidate, ImportBody, ProviderId, SearchBody};
use super::{ExternalCatalog, ExternalCatalogError};
use crate::catalog::MovieSummary;
use crate::http::{read_json, ApiClient};

const SEARCH_PATH: &str = "tmdb/search";
const IMPORT_PATH: &str = "tmdb/import";

/// TMDB client backed by the catalog service proxy.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api: ApiClient,
}

impl TmdbClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn import_path(id: &ProviderId) -> String {
        format!("{}/{}", IMPORT_PATH, urlencoding::encode(id.as_str()))
    }
}

#[async_trait]
impl ExternalCatalog for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>, ExternalCatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ExternalCatalogError::EmptyQuery);
        }

        debug!("TMDB search: query='{}'", query);

        let response = match self
            .api
            .get(SEARCH_PATH, &[("query", query.to_string())])
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let body: SearchBody = read_json(response).await?;
        let candidates = body.into_candidates();
        debug!("TMDB search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn import(&self, id: &ProviderId) -> Result<MovieSummary, ExternalCatalogError> {
        debug!("TMDB import: id={}", id);

        let response = self
            .api
            .post_empty(&Self::import_path(id))
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    ExternalCatalogError::Conflict(e.user_message())
                } else if e.is_not_found() {
                    ExternalCatalogError::NotFound(format!("TMDB ID {}", id))
                } else {
                    e.into()
                }
            })?;

        let body: ImportBody = read_json(response).await?;
        Ok(body.into_movie())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn client() -> TmdbClient {
        let api = ApiClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            page_size: 12,
        })
        .unwrap();
        TmdbClient::new(api)
    }

    #[test]
    fn test_import_path_is_encoded() {
        assert_eq!(
            TmdbClient::import_path(&ProviderId::new("603")),
            "tmdb/import/603"
        );
        assert_eq!(
            TmdbClient::import_path(&ProviderId::new("a b")),
            "tmdb/import/a%20b"
        );
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_before_network() {
        let err = client().search("   ").await.unwrap_err();
        assert!(matches!(err, ExternalCatalogError::EmptyQuery));
    }
}
