//! Error handling for the TeachEase client

use std::fmt;
use thiserror::Error;

/// Unified error type for the TeachEase client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Sign-in, sign-up and password reset failures
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Any failure reading or writing the document store
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A document the caller expected is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side input checks, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new fetch error
    pub fn fetch<T: fmt::Display>(msg: T) -> Self {
        Error::Fetch(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Collapse transport and decoding failures into `Error::Fetch`.
    /// Fetch, not-found and validation errors pass through unchanged.
    pub fn into_fetch(self) -> Self {
        match self {
            Error::Http(_) | Error::Json(_) | Error::Url(_) | Error::Auth(_) | Error::Config(_) => {
                Error::Fetch(self.to_string())
            }
            other => other,
        }
    }

    /// Whether this is a missing-document error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Error codes reported by the authentication service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    WrongPassword,
    UserNotFound,
    UserDisabled,
    NetworkRequestFailed,
    EmailAlreadyInUse,
    WeakPassword,
    Other,
}

impl AuthErrorCode {
    /// Map a backend error code onto the fixed vocabulary.
    ///
    /// The Identity Toolkit REST API reports codes such as `EMAIL_NOT_FOUND`
    /// or `WEAK_PASSWORD : Password should be at least 6 characters`; only the
    /// part before the first space is significant.
    pub fn from_backend(code: &str) -> Self {
        let code = code.split_whitespace().next().unwrap_or_default();
        match code {
            "INVALID_EMAIL" | "ERROR_INVALID_EMAIL" => AuthErrorCode::InvalidEmail,
            "INVALID_PASSWORD" | "ERROR_WRONG_PASSWORD" => AuthErrorCode::WrongPassword,
            "EMAIL_NOT_FOUND" | "ERROR_USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "USER_DISABLED" | "ERROR_USER_DISABLED" => AuthErrorCode::UserDisabled,
            "ERROR_NETWORK_REQUEST_FAILED" => AuthErrorCode::NetworkRequestFailed,
            "EMAIL_EXISTS" | "ERROR_EMAIL_ALREADY_IN_USE" => AuthErrorCode::EmailAlreadyInUse,
            "WEAK_PASSWORD" | "ERROR_WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            _ => AuthErrorCode::Other,
        }
    }
}

/// A structured failure from the authentication service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    /// The backend's own message text
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build from a raw backend code, keeping it as the message
    pub fn from_backend(code: &str) -> Self {
        Self::new(AuthErrorCode::from_backend(code), code)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::NetworkRequestFailed, message)
    }

    /// The sign-in message shown to the user
    pub fn user_message(&self) -> String {
        match self.code {
            AuthErrorCode::InvalidEmail => "Invalid email format!".to_string(),
            AuthErrorCode::WrongPassword => "Incorrect password!".to_string(),
            AuthErrorCode::UserNotFound => "No user found with this email!".to_string(),
            AuthErrorCode::UserDisabled => "User account is disabled!".to_string(),
            AuthErrorCode::NetworkRequestFailed => "Network error, please try again!".to_string(),
            _ => format!("Login failed: {}", self.message),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
