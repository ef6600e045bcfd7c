//! Authentication through the Identity Toolkit REST API

mod memory;
mod session;
mod types;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::{BackendConfig, ClientOptions};
use crate::error::{AuthError, Error, Result};
use crate::fetch::Fetch;

pub use memory::*;
pub use session::*;
pub use types::*;

/// The authentication capabilities the app relies on
#[async_trait]
pub trait Auth: Send + Sync {
    /// The id of the signed-in user, if any
    fn current_user_id(&self) -> Option<String>;

    /// Sign in with email and password, returning the user id
    async fn sign_in(&self, email: &str, password: &str) -> Result<String>;

    /// Create an account and sign it in, returning the user id
    async fn sign_up(&self, email: &str, password: &str) -> Result<String>;

    /// Email a password reset link
    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// Drop the current session
    async fn sign_out(&self) -> Result<()>;
}

/// Client for the Identity Toolkit REST API
#[derive(Clone)]
pub struct FirebaseAuth {
    /// The base URL of the Identity Toolkit API
    url: String,

    /// The web API key of the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: SharedSession,
}

impl FirebaseAuth {
    /// Create a new FirebaseAuth client
    pub fn new(
        config: &BackendConfig,
        options: &ClientOptions,
        client: Client,
        session: SharedSession,
    ) -> Self {
        Self {
            url: options.identity_url.clone(),
            key: config.api_key.clone(),
            client,
            session,
        }
    }

    fn get_auth_url(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.url, method)
    }

    /// The current session
    pub fn get_session(&self) -> Option<Session> {
        self.session.get()
    }

    /// Replace the current session
    pub fn set_session(&self, session: Session) {
        self.session.set(Some(session));
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let url = self.get_auth_url(method);

        let result = Fetch::post(&self.client, &url)
            .query("key", &self.key)
            .json(body)?
            .execute::<T>()
            .await;

        match result {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(api_error)) => Err(AuthError::from_backend(&api_error.message).into()),
            Err(Error::Http(e)) => Err(AuthError::network(e.to_string()).into()),
            Err(e) => Err(e),
        }
    }

    fn store_session(&self, response: &TokenResponse) {
        self.session.set(Some(Session::new(
            response.id_token.clone(),
            response.refresh_token.clone(),
            response.local_id.clone(),
            response.expires_in_secs(),
        )));
    }
}

#[async_trait]
impl Auth for FirebaseAuth {
    fn current_user_id(&self) -> Option<String> {
        self.session.get().map(|session| session.user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let response: TokenResponse = self
            .call("signInWithPassword", &PasswordCredentials::new(email, password))
            .await
            .inspect_err(|e| error!("Login failed: {}", e))?;

        self.store_session(&response);
        info!("Signed in user {}", response.local_id);
        Ok(response.local_id)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        let response: TokenResponse = self
            .call("signUp", &PasswordCredentials::new(email, password))
            .await
            .inspect_err(|e| error!("Signup failed: {}", e))?;

        self.store_session(&response);
        info!("Created user {}", response.local_id);
        Ok(response.local_id)
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let response: OobCodeResponse = self
            .call("sendOobCode", &OobCodeRequest::password_reset(email))
            .await?;
        info!(
            "Password reset link sent to {}",
            response.email.as_deref().unwrap_or(email)
        );
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.set(None);
        Ok(())
    }
}
