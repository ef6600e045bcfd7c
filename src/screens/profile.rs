//! Profile creation and profile view screens

use chrono::NaiveDate;
use tracing::{error, warn};

use crate::error::{Error, Result};
use crate::navigation::Route;
use crate::profile::{format_date_of_birth, load_profile, save_profile, UserProfile, LANGUAGES};
use crate::screens::{LoadState, Outcome};
use crate::Backend;

const NOT_AUTHENTICATED: &str = "User not authenticated";

/// Profile creation form
pub struct CreateProfileScreen {
    backend: Backend,
    pub profile: UserProfile,
}

impl CreateProfileScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            profile: UserProfile::default(),
        }
    }

    /// The dropdown choices
    pub fn languages(&self) -> &'static [&'static str] {
        &LANGUAGES
    }

    /// Pick a language from the dropdown; it replaces any earlier pick
    pub fn select_language(&mut self, language: &str) -> Result<()> {
        if !LANGUAGES.contains(&language) {
            return Err(Error::validation(format!("unsupported language: {}", language)));
        }
        self.profile.languages = language.to_string();
        Ok(())
    }

    /// Fill the date of birth from the date picker
    pub fn pick_date_of_birth(&mut self, date: NaiveDate) {
        self.profile.date_of_birth = format_date_of_birth(date);
    }

    pub async fn save(&mut self) -> Outcome {
        let Some(user_id) = self.backend.auth.current_user_id() else {
            return Outcome::notice(NOT_AUTHENTICATED).and_route(Route::SignIn);
        };

        match save_profile(self.backend.store.as_ref(), &user_id, &self.profile).await {
            Ok(()) => Outcome::notice("Profile saved!").and_route(Route::Home),
            Err(e) => {
                error!("Saving profile of {} failed: {}", user_id, e);
                Outcome::notice(format!("Failed to save profile: {}", e))
            }
        }
    }
}

/// Read-only view of the signed-in user's profile
pub struct ProfileScreen {
    backend: Backend,
    pub state: LoadState<UserProfile>,
}

impl ProfileScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: LoadState::Idle,
        }
    }

    /// Load the profile. Without a session this routes to sign-in; without a
    /// saved profile it routes to profile creation.
    pub async fn load(&mut self) -> Outcome {
        let Some(user_id) = self.backend.auth.current_user_id() else {
            return Outcome::notice(NOT_AUTHENTICATED).and_route(Route::SignIn);
        };

        self.state = LoadState::Loading;
        match load_profile(self.backend.store.as_ref(), &user_id).await {
            Ok(profile) => {
                self.state = LoadState::Loaded(profile);
                Outcome::none()
            }
            Err(Error::NotFound(_)) => {
                warn!("No profile saved for {}", user_id);
                self.state = LoadState::Idle;
                Outcome::route(Route::CreateProfile)
            }
            Err(e) => {
                error!("Loading profile of {} failed: {}", user_id, e);
                self.state = LoadState::Failed("Failed to load profile".to_string());
                Outcome::none()
            }
        }
    }

    pub async fn sign_out(&mut self) -> Outcome {
        if let Err(e) = self.backend.auth.sign_out().await {
            return Outcome::notice(format!("Error: {}", e));
        }
        self.state = LoadState::Idle;
        Outcome::route(Route::SignIn)
    }

    pub fn back(&self) -> Route {
        Route::Back
    }
}
