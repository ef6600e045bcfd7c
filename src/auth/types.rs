//! Request and response types for the Identity Toolkit REST API

use serde::{Deserialize, Serialize};

/// Email and password credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
    /// Ask for an ID and refresh token in the response
    pub return_secure_token: bool,
}

impl PasswordCredentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            return_secure_token: true,
        }
    }
}

/// Response of `accounts:signInWithPassword` and `accounts:signUp`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime in seconds, sent as a string
    #[serde(default)]
    pub expires_in: Option<String>,
    pub local_id: String,
}

impl TokenResponse {
    pub fn expires_in_secs(&self) -> i64 {
        parse_expires_in(self.expires_in.as_deref())
    }
}

/// Token lifetimes travel as strings; a missing or garbled one means an hour
fn parse_expires_in(value: Option<&str>) -> i64 {
    value.and_then(|s| s.parse().ok()).unwrap_or(3600)
}

/// Body of the Secure Token `token` call
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest {
    pub grant_type: &'static str,
    pub refresh_token: String,
}

impl RefreshTokenRequest {
    pub fn new(refresh_token: &str) -> Self {
        Self {
            grant_type: "refresh_token",
            refresh_token: refresh_token.to_string(),
        }
    }
}

/// Response of the Secure Token `token` call. Unlike the Identity Toolkit,
/// this API uses snake_case field names.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<String>,
    pub user_id: String,
}

impl RefreshTokenResponse {
    pub fn expires_in_secs(&self) -> i64 {
        parse_expires_in(self.expires_in.as_deref())
    }
}

/// Body of `accounts:sendOobCode`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCodeRequest {
    pub request_type: &'static str,
    pub email: String,
}

impl OobCodeRequest {
    pub fn password_reset(email: &str) -> Self {
        Self {
            request_type: "PASSWORD_RESET",
            email: email.to_string(),
        }
    }
}

/// Response of `accounts:sendOobCode`
#[derive(Debug, Clone, Deserialize)]
pub struct OobCodeResponse {
    #[serde(default)]
    pub email: Option<String>,
}
