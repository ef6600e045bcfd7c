//! Course search screen

use tracing::error;

use crate::catalog::{search, Course};
use crate::navigation::Route;
use crate::screens::home::CARD_PREVIEW_CHARS;
use crate::screens::LoadState;
use crate::Backend;

pub struct SearchScreen {
    backend: Backend,
    pub query: String,
    pub state: LoadState<Vec<Course>>,
}

impl SearchScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            query: String::new(),
            state: LoadState::Idle,
        }
    }

    /// Run the search. An empty query leaves the screen untouched.
    pub async fn submit(&mut self) {
        if self.query.is_empty() {
            return;
        }

        self.state = LoadState::Loading;
        self.state = match search(self.backend.store.as_ref(), &self.query).await {
            Ok(courses) => LoadState::Loaded(courses),
            Err(e) => {
                error!("Error searching courses for {:?}: {}", self.query, e);
                LoadState::Failed("Error occurred while fetching courses".to_string())
            }
        };
    }

    pub fn results(&self) -> &[Course] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn card_preview(course: &Course) -> String {
        format!("{}...", course.preview(CARD_PREVIEW_CHARS))
    }

    pub fn open_course(&self, course: &Course) -> Route {
        Route::SearchCourseDetail(course.reference())
    }

    pub fn back(&self) -> Route {
        Route::Back
    }
}
