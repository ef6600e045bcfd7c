//! Home screen: categories with their courses

use tracing::error;

use crate::catalog::{load_categories, Category, Course};
use crate::navigation::Route;
use crate::screens::{LoadState, Tab};
use crate::Backend;

/// Characters of description shown on a course card
pub const CARD_PREVIEW_CHARS: usize = 50;

pub struct HomeScreen {
    backend: Backend,
    pub state: LoadState<Vec<Category>>,
}

impl HomeScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: LoadState::Idle,
        }
    }

    /// Fetch categories afresh. A failure leaves the list empty.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.state = match load_categories(self.backend.store.as_ref()).await {
            Ok(categories) => LoadState::Loaded(categories),
            Err(e) => {
                error!("Error fetching categories or courses: {}", e);
                LoadState::Failed("Error occurred while fetching courses".to_string())
            }
        };
    }

    /// The loaded categories, empty until a load succeeds
    pub fn categories(&self) -> &[Category] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn card_preview(course: &Course) -> String {
        course.preview(CARD_PREVIEW_CHARS)
    }

    pub fn open_course(&self, course: &Course) -> Route {
        Route::CourseDetail(course.reference())
    }

    pub fn select_tab(&self, tab: Tab) -> Route {
        tab.route()
    }
}
