//! The signed-in session: token, claims and role.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::types::{Claims, Credentials, Registration};
use super::{AuthError, IdentityProvider};
use crate::http::ApiClient;
use crate::session::SessionStore;

/// Login state shared by every service client through [`ApiClient`].
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    api: ApiClient,
}

impl AuthSession {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        api: ApiClient,
    ) -> Self {
        Self {
            provider,
            store,
            api,
        }
    }

    /// Load the stored token into the API client.
    ///
    /// An expired token is dropped from the store and `None` is returned.
    pub async fn restore(&self) -> Result<Option<Claims>, AuthError> {
        let Some(token) = self.store.load()?.token else {
            self.api.set_token(None).await;
            return Ok(None);
        };

        let claims = Self::claims_of(&token);
        if claims.is_expired_at(Utc::now()) {
            warn!("Stored session expired, signing out");
            self.logout().await?;
            return Ok(None);
        }

        self.api.set_token(Some(token)).await;
        Ok(Some(claims))
    }

    /// Log in and persist the token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Claims, AuthError> {
        let credentials = Credentials::new(email, password)?;
        self.login_with(&credentials).await
    }

    async fn login_with(&self, credentials: &Credentials) -> Result<Claims, AuthError> {
        let token = self.provider.login(credentials).await?;
        let claims = Self::claims_of(&token);

        self.store
            .update(&mut |data| data.token = Some(token.clone()))?;
        self.api.set_token(Some(token)).await;

        info!(
            email = %credentials.email,
            role = claims.role.as_deref().unwrap_or("-"),
            provider = self.provider.provider_name(),
            "Logged in"
        );
        Ok(claims)
    }

    /// Create an account, then log in with it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Claims, AuthError> {
        let registration = Registration::new(email, password, password_confirm)?;
        self.provider.register(&registration).await?;
        info!(email = %registration.email, "Registered");
        self.login_with(&registration.credentials()).await
    }

    /// Drop the token and the active profile.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.update(&mut |data| {
            data.token = None;
            data.active_profile = None;
        })?;
        self.api.set_token(None).await;
        info!("Logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.store.load()?.token.is_some())
    }

    /// Claims of the stored token, if signed in.
    pub fn claims(&self) -> Result<Option<Claims>, AuthError> {
        Ok(self.store.load()?.token.as_deref().map(Self::claims_of))
    }

    pub fn role(&self) -> Result<Option<String>, AuthError> {
        Ok(self.claims()?.and_then(|c| c.role))
    }

    /// Claims that cannot be decoded are treated as empty; the token is still used.
    fn claims_of(token: &str) -> Claims {
        Claims::from_token(token).unwrap_or_else(|e| {
            warn!(error = %e, "Token claims unreadable");
            Claims::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::profiles::ActiveProfile;
    use crate::session::{MemorySessionStore, SessionData};
    use crate::testing::{fixtures, MockIdentityProvider};

    fn api() -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            page_size: 12,
        })
        .unwrap()
    }

    fn session(
        provider: &Arc<MockIdentityProvider>,
        store: &Arc<MemorySessionStore>,
    ) -> (AuthSession, ApiClient) {
        let api = api();
        (
            AuthSession::new(provider.clone(), store.clone(), api.clone()),
            api,
        )
    }

    #[tokio::test]
    async fn test_login_stores_token_and_role() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.add_user("ana@example.com", "secret1", "admin").await;
        let store = Arc::new(MemorySessionStore::new());
        let (auth, api) = session(&provider, &store);

        let claims = auth.login("ana@example.com", "secret1").await.unwrap();
        assert!(claims.is_admin());
        assert!(auth.is_authenticated().unwrap());
        assert_eq!(auth.role().unwrap().as_deref(), Some("admin"));
        assert!(api.has_token().await);
    }

    #[tokio::test]
    async fn test_bad_password() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.add_user("ana@example.com", "secret1", "user").await;
        let store = Arc::new(MemorySessionStore::new());
        let (auth, _) = session(&provider, &store);

        assert!(matches!(
            auth.login("ana@example.com", "nope").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(!auth.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_register_mismatch_makes_no_call() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(MemorySessionStore::new());
        let (auth, _) = session(&provider, &store);

        let err = auth
            .register("ana@example.com", "secret1", "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_then_logged_in() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(MemorySessionStore::new());
        let (auth, _) = session(&provider, &store);

        auth.register("new@example.com", "secret1", "secret1")
            .await
            .unwrap();
        assert!(auth.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_profile() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(MemorySessionStore::with_data(SessionData {
            token: Some(fixtures::jwt("u1", "user", 4_000_000_000)),
            active_profile: Some(ActiveProfile {
                id: "p1".to_string(),
                name: "Ana".to_string(),
            }),
            ..Default::default()
        }));
        let (auth, api) = session(&provider, &store);

        assert!(auth.restore().await.unwrap().is_some());
        assert!(api.has_token().await);

        auth.logout().await.unwrap();
        let data = store.load().unwrap();
        assert!(data.token.is_none());
        assert!(data.active_profile.is_none());
        assert!(!api.has_token().await);
    }

    #[tokio::test]
    async fn test_expired_token_is_dropped_on_restore() {
        let provider = Arc::new(MockIdentityProvider::new());
        let store = Arc::new(MemorySessionStore::with_data(SessionData {
            token: Some(fixtures::jwt("u1", "user", 1_000)),
            ..Default::default()
        }));
        let (auth, api) = session(&provider, &store);

        assert!(auth.restore().await.unwrap().is_none());
        assert!(store.load().unwrap().token.is_none());
        assert!(!api.has_token().await);
    }
}
