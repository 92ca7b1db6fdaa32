//! Session state and the sign-up/login client
//!
//! The bearer token and the user record live in the local store under the
//! `token` and `user` keys, and are read synchronously on demand.

use crate::api::{ApiClient, ApiResult};
use crate::error::{CoreError, Result};
use crate::storage::LocalStore;
use icpwiz_types::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Successful sign-up or login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Read/write access to the persisted session
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn LocalStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// The stored user; a malformed record reads as logged out
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.store.get_item(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session user");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| warn!(error = %e, "Stored user record is malformed"))
            .ok()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let user = serde_json::to_string(&session.user).map_err(|source| CoreError::Encode {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.store.set_item(TOKEN_KEY, &session.token)?;
        self.store.set_item(USER_KEY, &user)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove_item(TOKEN_KEY)?;
        self.store.remove_item(USER_KEY)
    }

    /// The current user, or [`CoreError::NotAuthenticated`]
    pub fn require_user(&self) -> Result<User> {
        match (self.token(), self.current_user()) {
            (Some(_), Some(user)) => Ok(user),
            _ => Err(CoreError::NotAuthenticated),
        }
    }
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Thin wrapper over the auth endpoints that persists the session
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthSession> {
        let request = self
            .api
            .post(&["api", "auth", "signup"])
            .json(&SignupRequest {
                name,
                email,
                password,
            });
        let result = self.api.send(request).await;
        self.persist(result)
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let request = self
            .api
            .post(&["api", "auth", "login"])
            .json(&LoginRequest { email, password });
        let result = self.api.send(request).await;
        self.persist(result)
    }

    pub fn logout(&self) -> Result<()> {
        self.api.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.api.session().current_user()
    }

    fn persist(&self, result: ApiResult<AuthSession>) -> ApiResult<AuthSession> {
        let Some(session) = result.data.as_ref() else {
            return result;
        };
        if let Err(e) = self.api.session().save(session) {
            return ApiResult::failure(format!("Failed to store session: {}", e), result.status);
        }
        info!(user = %session.user.email, "Session stored");
        result
    }
}
