//! Configuration options for the TeachEase client

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default Firestore REST endpoint
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default Identity Toolkit REST endpoint
pub const IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default Secure Token REST endpoint, which exchanges refresh tokens
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Project credentials for the backend.
/// Load these from the environment or a secure config source.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
}

impl BackendConfig {
    /// Creates a new configuration, rejecting empty values.
    pub fn new(project_id: &str, api_key: &str) -> Result<Self> {
        if project_id.is_empty() {
            return Err(Error::config("project_id cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("api_key cannot be empty"));
        }
        Ok(Self {
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Attempts to create configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let project_id = std::env::var("TEACHEASE_PROJECT_ID").map_err(|_| {
            Error::config("TEACHEASE_PROJECT_ID environment variable not found")
        })?;
        let api_key = std::env::var("TEACHEASE_API_KEY")
            .map_err(|_| Error::config("TEACHEASE_API_KEY environment variable not found"))?;
        Self::new(&project_id, &api_key)
    }
}

/// Configuration options for the TeachEase client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The Firestore database id
    pub database_id: String,

    /// Base URL of the Firestore REST API
    pub firestore_url: String,

    /// Base URL of the Identity Toolkit REST API
    pub identity_url: String,

    /// Base URL of the Secure Token REST API
    pub secure_token_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            database_id: "(default)".to_string(),
            firestore_url: FIRESTORE_URL.to_string(),
            identity_url: IDENTITY_URL.to_string(),
            secure_token_url: SECURE_TOKEN_URL.to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database id
    pub fn with_database_id(mut self, value: &str) -> Self {
        self.database_id = value.to_string();
        self
    }

    /// Point the document store at another endpoint (an emulator or a mock server)
    pub fn with_firestore_url(mut self, value: &str) -> Self {
        self.firestore_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Point the auth service at another endpoint
    pub fn with_identity_url(mut self, value: &str) -> Self {
        self.identity_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Point token refreshes at another endpoint
    pub fn with_secure_token_url(mut self, value: &str) -> Self {
        self.secure_token_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Route every service to a single base URL
    pub fn with_base_url(self, value: &str) -> Self {
        self.with_firestore_url(value)
            .with_identity_url(value)
            .with_secure_token_url(value)
    }

    /// Check that every endpoint parses
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.firestore_url)?;
        Url::parse(&self.identity_url)?;
        Url::parse(&self.secure_token_url)?;
        Ok(())
    }
}
