//! Sign-in, sign-up and password reset screens

use tracing::error;

use crate::error::{Error, Result};
use crate::navigation::Route;
use crate::profile::profile_exists;
use crate::screens::Outcome;
use crate::Backend;

fn failure_message(e: &Error) -> String {
    match e {
        Error::Auth(auth_error) => auth_error.message.clone(),
        other => other.to_string(),
    }
}

/// Email and password sign-in
pub struct SignInScreen {
    backend: Backend,
    pub email: String,
    pub password: String,
}

impl SignInScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            email: String::new(),
            password: String::new(),
        }
    }

    /// Sign in, then route to the home screen when the user already has a
    /// profile, or to profile creation when not
    pub async fn submit(&mut self) -> Outcome {
        let user_id = match self.backend.auth.sign_in(&self.email, &self.password).await {
            Ok(user_id) => user_id,
            Err(Error::Auth(e)) => return Outcome::notice(e.user_message()),
            Err(e) => return Outcome::notice(format!("Login failed: {}", e)),
        };

        match profile_exists(self.backend.store.as_ref(), &user_id).await {
            Ok(true) => Outcome::route(Route::Home),
            Ok(false) => Outcome::route(Route::CreateProfile),
            Err(e) => {
                error!("Profile lookup after sign-in failed: {}", e);
                Outcome::notice(format!("Error: {}", failure_message(&e)))
            }
        }
    }

    pub fn forgot_password(&self) -> Route {
        Route::ForgotPassword
    }

    pub fn sign_up(&self) -> Route {
        Route::SignUp
    }
}

/// Account creation
pub struct SignUpScreen {
    backend: Backend,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }

    /// Client-side checks, run before any backend call
    pub fn validate(&self) -> Result<()> {
        if self.password != self.confirm_password {
            return Err(Error::validation("Passwords do not match!"));
        }
        Ok(())
    }

    /// Validate, then create the account. Returns the new user id.
    pub async fn register(&self) -> Result<String> {
        self.validate()?;
        self.backend.auth.sign_up(&self.email, &self.password).await
    }

    pub async fn submit(&mut self) -> Outcome {
        match self.register().await {
            Ok(_) => Outcome::notice("Signup successful! Welcome!").and_route(Route::CreateProfile),
            Err(Error::Validation(message)) => Outcome::notice(message),
            Err(e) => {
                error!("Signup failed: {}", e);
                Outcome::notice(format!("Signup failed: {}", failure_message(&e)))
            }
        }
    }

    pub fn sign_in(&self) -> Route {
        Route::SignIn
    }
}

/// Password reset request
pub struct ForgotPasswordScreen {
    backend: Backend,
    pub email: String,
}

impl ForgotPasswordScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            email: String::new(),
        }
    }

    /// Send the reset link; an empty email never reaches the backend
    pub async fn request_reset(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(Error::validation("Please enter a valid email"));
        }
        self.backend.auth.send_password_reset(&self.email).await
    }

    pub async fn submit(&mut self) -> Outcome {
        match self.request_reset().await {
            Ok(()) => Outcome::notice("Password reset link sent!").and_route(Route::Back),
            Err(Error::Validation(message)) => Outcome::notice(message),
            Err(e) => Outcome::notice(format!("Error: {}", failure_message(&e))),
        }
    }
}
