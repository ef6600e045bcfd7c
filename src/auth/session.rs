//! Session management for authentication

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::auth::types::{RefreshTokenRequest, RefreshTokenResponse};
use crate::config::{BackendConfig, ClientOptions};
use crate::error::Result;
use crate::fetch::{ApiError, Fetch};

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The ID token sent as bearer token to the document store
    pub id_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The user ID
    pub user_id: String,

    /// The lifetime in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(
        id_token: String,
        refresh_token: String,
        user_id: String,
        expires_in: i64,
    ) -> Self {
        Self {
            id_token,
            refresh_token,
            user_id,
            expires_in,
            expires_at: Some(now() + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now() >= expires_at,
            None => false,
        }
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

/// The session slot shared between the auth client and the document store client
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<RwLock<Option<Session>>>);

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Session> {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, session: Option<Session>) {
        match self.0.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    /// The ID token of a live session
    pub fn token(&self) -> Option<String> {
        self.get()
            .filter(|session| !session.is_expired())
            .map(|session| session.id_token)
    }

    /// The ID token to authorize a request with, refreshing an expired one.
    ///
    /// When the backend rejects the refresh token the session is dropped, so
    /// the user reads as signed out. Transport failures are returned and the
    /// session is kept for the next attempt.
    pub async fn live_token(&self, refresher: &TokenRefresher) -> Result<Option<String>> {
        let Some(session) = self.get() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session.id_token));
        }

        match refresher.refresh(&session.refresh_token).await? {
            Ok(response) => {
                debug!("Refreshed ID token of {}", response.user_id);
                let expires_in = response.expires_in_secs();
                let refreshed = Session::new(
                    response.id_token,
                    response.refresh_token,
                    response.user_id,
                    expires_in,
                );
                let token = refreshed.id_token.clone();
                self.set(Some(refreshed));
                Ok(Some(token))
            }
            Err(api_error) => {
                warn!("Session of {} could not be refreshed: {}", session.user_id, api_error);
                self.set(None);
                Ok(None)
            }
        }
    }
}

/// Exchanges refresh tokens for new ID tokens through the Secure Token API
#[derive(Clone)]
pub struct TokenRefresher {
    url: String,
    key: String,
    client: Client,
}

impl TokenRefresher {
    pub fn new(config: &BackendConfig, options: &ClientOptions, client: Client) -> Self {
        Self {
            url: format!("{}/token", options.secure_token_url),
            key: config.api_key.clone(),
            client,
        }
    }

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<std::result::Result<RefreshTokenResponse, ApiError>> {
        Fetch::post(&self.client, &self.url)
            .query("key", &self.key)
            .json(&RefreshTokenRequest::new(refresh_token))?
            .execute::<RefreshTokenResponse>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_sessions_have_no_token() {
        let shared = SharedSession::new();
        assert!(shared.token().is_none());

        shared.set(Some(Session::new(
            "id".into(),
            "refresh".into(),
            "uid".into(),
            3600,
        )));
        assert_eq!(shared.token().as_deref(), Some("id"));

        let mut expired = Session::new("old".into(), "r".into(), "uid".into(), 3600);
        expired.expires_at = Some(0);
        assert!(expired.is_expired());
        shared.set(Some(expired));
        assert!(shared.token().is_none());
        assert_eq!(shared.get().map(|s| s.user_id).as_deref(), Some("uid"));
    }
}
