//! Course detail screen, reached from home or search

use tracing::error;

use crate::catalog::{load_course, Course, CourseRef};
use crate::error::Error;
use crate::navigation::Route;
use crate::screens::LoadState;
use crate::Backend;

pub struct CourseDetailScreen {
    backend: Backend,
    pub course: CourseRef,
    pub state: LoadState<Course>,
}

impl CourseDetailScreen {
    pub fn new(backend: Backend, course: CourseRef) -> Self {
        Self {
            backend,
            course,
            state: LoadState::Idle,
        }
    }

    /// Build the screen for a course route; other routes give `None`
    pub fn for_route(backend: Backend, route: &Route) -> Option<Self> {
        match route {
            Route::CourseDetail(course) | Route::SearchCourseDetail(course) => {
                Some(Self::new(backend, course.clone()))
            }
            _ => None,
        }
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.state = match load_course(self.backend.store.as_ref(), &self.course).await {
            Ok(course) => LoadState::Loaded(course),
            Err(Error::NotFound(_)) => LoadState::Failed("Course not found".to_string()),
            Err(e) => {
                error!("Loading course {:?} failed: {}", self.course, e);
                LoadState::Failed("Error occurred while fetching courses".to_string())
            }
        };
    }

    /// The description as plain text, once loaded
    pub fn description(&self) -> Option<String> {
        self.state.value().map(Course::description_text)
    }

    pub fn back(&self) -> Route {
        Route::Back
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryAuth;
    use crate::catalog::courses_path;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_same_fields_different_courses() {
        let store = Arc::new(MemoryStore::new());
        let twin = json!({
            "courseName": "Intro", "courseDescription": "<p>Same &amp; same</p>", "imageUrl": ""
        });
        store.insert(&courses_path("a"), "c1", twin.clone());
        store.insert(&courses_path("b"), "c1", twin);
        let backend = Backend::new(store, Arc::new(MemoryAuth::new()));

        let route = Route::SearchCourseDetail(CourseRef::new("b", "c1"));
        let mut screen = CourseDetailScreen::for_route(backend.clone(), &route).unwrap();
        screen.load().await;

        let course = screen.state.value().unwrap();
        assert_eq!(course.category_id, "b");
        assert_eq!(screen.description().as_deref(), Some("Same & same"));
        assert!(CourseDetailScreen::for_route(backend, &Route::Home).is_none());
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let store = Arc::new(MemoryStore::new());
        let backend = Backend::new(store, Arc::new(MemoryAuth::new()));
        let mut screen = CourseDetailScreen::new(backend, CourseRef::new("a", "missing"));
        screen.load().await;
        assert_eq!(screen.state.error(), Some("Course not found"));
        assert!(screen.description().is_none());
    }
}
