//! HTTP implementation of the catalog service.

use async_trait::async_trait;
use tracing::debug;

use super::types::{ListBody, ListRequest, MoviePayload, MovieSummary, ResultPage};
use super::{CatalogError, CatalogService};
use crate::http::{read_json, ApiClient, HttpError};
use crate::query::{QueryDescriptor, QueryField};

const MOVIES_PATH: &str = "movies";

/// Catalog service client over [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    api: ApiClient,
}

impl HttpCatalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn movie_path(id: &str) -> String {
        format!("{}/{}", MOVIES_PATH, urlencoding::encode(id))
    }

    /// Query parameter used by the service for each classified field.
    fn search_param(field: QueryField) -> &'static str {
        match field {
            QueryField::Title => "search",
            QueryField::Genre => "genre",
            QueryField::Year => "year",
        }
    }

    fn not_found_or(id: &str, err: HttpError) -> CatalogError {
        if err.is_not_found() {
            CatalogError::NotFound(id.to_string())
        } else {
            CatalogError::Http(err)
        }
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn list(&self, request: &ListRequest) -> Result<ResultPage, CatalogError> {
        debug!(?request, "Catalog list");

        match self.api.get(MOVIES_PATH, &request.query_params()).await {
            Ok(response) => {
                let body: ListBody = read_json(response).await?;
                Ok(body.into_page())
            }
            // the service answers 404 for "nothing matched"
            Err(e) if e.is_not_found() => Ok(ResultPage::empty()),
            Err(e) => Err(e.into()),
        }
    }

    async fn search(&self, query: &QueryDescriptor) -> Result<Vec<MovieSummary>, CatalogError> {
        debug!(field = %query.field, value = %query.value, "Catalog search");

        let params = [(Self::search_param(query.field), query.value.clone())];
        match self.api.get(MOVIES_PATH, &params).await {
            Ok(response) => {
                let body: ListBody = read_json(response).await?;
                Ok(body.into_items())
            }
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<MovieSummary, CatalogError> {
        let response = self
            .api
            .get(&Self::movie_path(id), &[])
            .await
            .map_err(|e| Self::not_found_or(id, e))?;
        Ok(read_json(response).await?)
    }

    async fn create(&self, payload: &MoviePayload) -> Result<MovieSummary, CatalogError> {
        if payload.title.trim().is_empty() {
            return Err(CatalogError::Invalid("title is required".to_string()));
        }
        let response = self.api.post_json(MOVIES_PATH, payload).await?;
        Ok(read_json(response).await?)
    }

    async fn update(
        &self,
        id: &str,
        payload: &MoviePayload,
    ) -> Result<MovieSummary, CatalogError> {
        let response = self
            .api
            .put_json(&Self::movie_path(id), payload)
            .await
            .map_err(|e| Self::not_found_or(id, e))?;
        Ok(read_json(response).await?)
    }

    async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        self.api
            .delete(&Self::movie_path(id))
            .await
            .map_err(|e| Self::not_found_or(id, e))?;
        Ok(())
    }
}
