//! TeachEase client library
//!
//! The client core of the TeachEase course browsing app: authentication,
//! user profiles, course categories and course search, backed by the
//! Firebase Identity Toolkit and Cloud Firestore REST APIs.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod navigation;
pub mod profile;
pub mod screens;
pub mod store;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::{Auth, FirebaseAuth, SharedSession};
use crate::config::{BackendConfig, ClientOptions};
use crate::error::Result;
use crate::store::{FirestoreClient, Store};

/// The backend capabilities handed to routines and screens
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn Auth>,
}

impl Backend {
    pub fn new(store: Arc<dyn Store>, auth: Arc<dyn Auth>) -> Self {
        Self { store, auth }
    }
}

/// The main entry point: one shared connection to the project's backend
pub struct TeachEase {
    /// HTTP client used for requests
    pub http_client: Client,
    /// Project credentials
    pub config: BackendConfig,
    /// Client options
    pub options: ClientOptions,
    auth: Arc<FirebaseAuth>,
    store: Arc<FirestoreClient>,
}

impl TeachEase {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use teachease::{TeachEase, config::BackendConfig};
    ///
    /// let config = BackendConfig::new("teachease-demo", "web-api-key").unwrap();
    /// let client = TeachEase::new(config).unwrap();
    /// ```
    pub fn new(config: BackendConfig) -> Result<Self> {
        Self::new_with_options(config, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use teachease::{TeachEase, config::{BackendConfig, ClientOptions}};
    ///
    /// let config = BackendConfig::new("teachease-demo", "web-api-key").unwrap();
    /// let options = ClientOptions::default()
    ///     .with_request_timeout(Some(Duration::from_secs(10)))
    ///     .with_base_url("http://127.0.0.1:8080");
    /// let client = TeachEase::new_with_options(config, options).unwrap();
    /// ```
    pub fn new_with_options(config: BackendConfig, options: ClientOptions) -> Result<Self> {
        options.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let session = SharedSession::new();
        let auth = FirebaseAuth::new(&config, &options, http_client.clone(), session.clone());
        let store = FirestoreClient::new(&config, &options, http_client.clone(), session);

        tracing::info!("TeachEase client initialized for project {}", config.project_id);

        Ok(Self {
            http_client,
            config,
            options,
            auth: Arc::new(auth),
            store: Arc::new(store),
        })
    }

    /// Create a client from `TEACHEASE_PROJECT_ID` and `TEACHEASE_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    /// The authentication client
    pub fn auth(&self) -> &FirebaseAuth {
        &self.auth
    }

    /// The document store client
    pub fn store(&self) -> &FirestoreClient {
        &self.store
    }

    /// The capabilities to hand to screens and routines
    pub fn backend(&self) -> Backend {
        Backend::new(self.store.clone(), self.auth.clone())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::Auth;
    pub use crate::catalog::{Category, Course, CourseRef};
    pub use crate::config::{BackendConfig, ClientOptions};
    pub use crate::error::Error;
    pub use crate::navigation::Route;
    pub use crate::profile::UserProfile;
    pub use crate::store::Store;
    pub use crate::{Backend, TeachEase};
}
