//! Thin HTTP wrapper around the catalog REST service.
//!
//! Every service client goes through [`ApiClient`], which owns the base URL,
//! the request timeout and the bearer token of the current session. Non-2xx
//! responses are turned into [`HttpError::Status`] carrying the message the
//! backend put in its `error` or `message` field.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ApiConfig;

/// Errors produced by the transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request could not be sent or the connection failed.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl HttpError {
    /// HTTP status of the failure, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::Transport(e) => e.status().map(|s| s.as_u16()),
            HttpError::Parse(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::Status { message, .. } => message.clone(),
            HttpError::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            HttpError::Transport(e) if e.is_connect() => "Network error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Shared HTTP client for the catalog service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the bearer token sent with every request.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, HttpError> {
        let builder = self.client.request(Method::GET, self.url(path)).query(query);
        self.send(builder).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, HttpError> {
        let builder = self.client.request(Method::POST, self.url(path)).json(body);
        self.send(builder).await
    }

    /// POST without a body (e.g., import triggers).
    pub async fn post_empty(&self, path: &str) -> Result<Response, HttpError> {
        let builder = self.client.request(Method::POST, self.url(path));
        self.send(builder).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, HttpError> {
        let builder = self.client.request(Method::PUT, self.url(path)).json(body);
        self.send(builder).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, HttpError> {
        let builder = self.client.request(Method::DELETE, self.url(path));
        self.send(builder).await
    }

    async fn send(&self, mut builder: RequestBuilder) -> Result<Response, HttpError> {
        if let Some(token) = self.token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Catalog service response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(HttpError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

/// Decode a JSON response body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| HttpError::Parse(e.to_string()))
}

/// Pick the most useful message out of an error body.
///
/// Order: `error` field, `message` field, raw body (first 200 chars), status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.chars().take(200).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 12,
            page_size: 12,
        }
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        let body = r#"{"error":"Profile not found","message":"ignored"}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "Profile not found"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_message_field() {
        let body = r#"{"message":"Token expired"}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, body),
            "Token expired"
        );
    }

    #[test]
    fn test_error_message_plain_text_and_empty() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"detail":"x"}"#),
            "Forbidden"
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = ApiClient::new(&api_config("http://localhost:4000/")).unwrap();
        assert_eq!(api.url("/movies"), "http://localhost:4000/movies");
        assert_eq!(api.url("movies/42"), "http://localhost:4000/movies/42");
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let api = ApiClient::new(&api_config("http://localhost:4000")).unwrap();
        assert!(!api.has_token().await);
        api.set_token(Some("abc".to_string())).await;
        assert!(api.has_token().await);

        let clone = api.clone();
        clone.set_token(None).await;
        assert!(!api.has_token().await);
    }

    #[test]
    fn test_status_error_helpers() {
        let err = HttpError::Status {
            status: 409,
            message: "Already imported".to_string(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert_eq!(err.user_message(), "Already imported");
    }
}
