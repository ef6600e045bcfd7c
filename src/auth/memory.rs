//! In-memory auth service, used as a test double

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::{AuthError, AuthErrorCode, Result};

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
    disabled: bool,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    current: Option<String>,
    reset_requests: Vec<String>,
    offline: bool,
}

/// An `Auth` whose accounts live in process memory
#[derive(Default)]
pub struct MemoryAuth {
    state: RwLock<State>,
    calls: AtomicUsize,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, returning its user id
    pub fn add_user(&self, email: &str, password: &str) -> String {
        let user_id = Uuid::new_v4().to_string();
        self.write(|s| {
            s.accounts.insert(
                email.to_string(),
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                    disabled: false,
                },
            );
        });
        user_id
    }

    pub fn disable_user(&self, email: &str) {
        self.write(|s| {
            if let Some(account) = s.accounts.get_mut(email) {
                account.disabled = true;
            }
        });
    }

    /// Start a session for `user_id` without going through sign-in
    pub fn sign_in_as(&self, user_id: &str) {
        self.write(|s| s.current = Some(user_id.to_string()));
    }

    /// Fail every request as if the device had no connectivity
    pub fn set_offline(&self, offline: bool) {
        self.write(|s| s.offline = offline);
    }

    /// Emails a password reset was sent to
    pub fn reset_requests(&self) -> Vec<String> {
        self.read(|s| s.reset_requests.clone())
    }

    /// Number of backend requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        match self.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        match self.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn enter(&self) -> std::result::Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.read(|s| s.offline) {
            return Err(AuthError::network("NETWORK_REQUEST_FAILED"));
        }
        Ok(())
    }
}

fn valid_email(email: &str) -> bool {
    matches!(email.split_once('@'), Some((user, domain)) if !user.is_empty() && domain.contains('.'))
}

#[async_trait]
impl Auth for MemoryAuth {
    fn current_user_id(&self) -> Option<String> {
        self.read(|s| s.current.clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        self.enter()?;
        if !valid_email(email) {
            return Err(AuthError::from_backend("INVALID_EMAIL").into());
        }
        let account = self
            .read(|s| s.accounts.get(email).cloned())
            .ok_or_else(|| AuthError::from_backend("EMAIL_NOT_FOUND"))?;
        if account.disabled {
            return Err(AuthError::from_backend("USER_DISABLED").into());
        }
        if account.password != password {
            return Err(AuthError::from_backend("INVALID_PASSWORD").into());
        }
        self.sign_in_as(&account.user_id);
        Ok(account.user_id)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<String> {
        self.enter()?;
        if !valid_email(email) {
            return Err(AuthError::from_backend("INVALID_EMAIL").into());
        }
        if password.len() < 6 {
            return Err(AuthError::new(
                AuthErrorCode::WeakPassword,
                "WEAK_PASSWORD : Password should be at least 6 characters",
            )
            .into());
        }
        if self.read(|s| s.accounts.contains_key(email)) {
            return Err(AuthError::from_backend("EMAIL_EXISTS").into());
        }
        let user_id = self.add_user(email, password);
        self.sign_in_as(&user_id);
        Ok(user_id)
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.enter()?;
        if !self.read(|s| s.accounts.contains_key(email)) {
            return Err(AuthError::from_backend("EMAIL_NOT_FOUND").into());
        }
        self.write(|s| s.reset_requests.push(email.to_string()));
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.write(|s| s.current = None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn code_of(result: Result<String>) -> AuthErrorCode {
        match result {
            Err(Error::Auth(e)) => e.code,
            other => panic!("expected an auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_in_outcomes() {
        let auth = MemoryAuth::new();
        let user_id = auth.add_user("ada@example.com", "secret1");

        assert_eq!(code_of(auth.sign_in("not-an-email", "x").await), AuthErrorCode::InvalidEmail);
        assert_eq!(
            code_of(auth.sign_in("bob@example.com", "x").await),
            AuthErrorCode::UserNotFound
        );
        assert_eq!(
            code_of(auth.sign_in("ada@example.com", "nope").await),
            AuthErrorCode::WrongPassword
        );
        assert!(auth.current_user_id().is_none());

        assert_eq!(auth.sign_in("ada@example.com", "secret1").await.unwrap(), user_id);
        assert_eq!(auth.current_user_id(), Some(user_id));

        auth.disable_user("ada@example.com");
        assert_eq!(
            code_of(auth.sign_in("ada@example.com", "secret1").await),
            AuthErrorCode::UserDisabled
        );
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicates_and_weak_passwords() {
        let auth = MemoryAuth::new();
        auth.sign_up("ada@example.com", "secret1").await.unwrap();
        assert_eq!(
            code_of(auth.sign_up("ada@example.com", "secret1").await),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            code_of(auth.sign_up("bob@example.com", "123").await),
            AuthErrorCode::WeakPassword
        );
    }

    #[tokio::test]
    async fn test_offline_requests_fail_with_network_error() {
        let auth = MemoryAuth::new();
        auth.add_user("ada@example.com", "secret1");
        auth.set_offline(true);
        assert_eq!(
            code_of(auth.sign_in("ada@example.com", "secret1").await),
            AuthErrorCode::NetworkRequestFailed
        );
        assert_eq!(auth.calls(), 1);
    }
}
