//! Mock identity provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures;
use crate::auth::{AuthError, Credentials, IdentityProvider, Registration};

#[derive(Debug, Clone)]
struct MockUser {
    password: String,
    role: String,
}

/// Mock implementation of the IdentityProvider trait.
///
/// Issues unsigned JWTs carrying the user's role, valid far into the future.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    users: Arc<RwLock<HashMap<String, MockUser>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    pub async fn add_user(&self, email: &str, password: &str, role: &str) {
        self.users.write().await.insert(
            email.to_string(),
            MockUser {
                password: password.to_string(),
                role: role.to_string(),
            },
        );
    }

    /// Number of login/register calls received.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.calls
            .write()
            .await
            .push(format!("login:{}", credentials.email));

        let users = self.users.read().await;
        match users.get(&credentials.email) {
            Some(user) if user.password == credentials.password => Ok(fixtures::jwt(
                &credentials.email,
                &user.role,
                4_000_000_000,
            )),
            _ => Err(AuthError::InvalidCredentials(
                "Invalid email or password".to_string(),
            )),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        self.calls
            .write()
            .await
            .push(format!("register:{}", registration.email));

        let mut users = self.users.write().await;
        if users.contains_key(&registration.email) {
            return Err(AuthError::InvalidCredentials(
                "Email already registered".to_string(),
            ));
        }
        users.insert(
            registration.email.clone(),
            MockUser {
                password: registration.password.clone(),
                role: "user".to_string(),
            },
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
