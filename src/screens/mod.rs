//! Headless view models, one per app screen.
//!
//! Each screen holds its view state and exposes async actions. An action
//! returns an [`Outcome`]: an optional short message for the user and an
//! optional route to navigate to. Errors never escape a screen; they end up
//! in its state or in the outcome's notice.

mod account;
mod course;
mod home;
mod profile;
mod search;

use crate::navigation::Route;

pub use account::*;
pub use course::*;
pub use home::*;
pub use profile::*;
pub use search::*;

/// What an action asks the shell to do next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// A transient message for the user
    pub notice: Option<String>,
    /// Where to navigate
    pub route: Option<Route>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            route: None,
        }
    }

    pub fn route(route: Route) -> Self {
        Self {
            notice: None,
            route: Some(route),
        }
    }

    pub fn and_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }
}

/// Progress of a screen's data load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Bottom navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Search,
    Profile,
}

impl Tab {
    pub fn route(self) -> Route {
        match self {
            Tab::Home => Route::Home,
            Tab::Search => Route::Search,
            Tab::Profile => Route::Profile,
        }
    }
}
