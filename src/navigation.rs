//! Path-based routes between screens

use std::fmt;

use crate::catalog::CourseRef;
use crate::error::{Error, Result};

/// A navigation destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    ForgotPassword,
    Home,
    CreateProfile,
    Profile,
    Search,
    /// Course opened from the home screen
    CourseDetail(CourseRef),
    /// Course opened from the search screen
    SearchCourseDetail(CourseRef),
    /// Pop the current screen
    Back,
}

impl Route {
    /// The destination the app starts on
    pub const START: Route = Route::SignIn;

    /// The route as a path, with parameters percent-encoded
    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "signin".to_string(),
            Route::SignUp => "signup".to_string(),
            Route::ForgotPassword => "forgot_password".to_string(),
            Route::Home => "home".to_string(),
            Route::CreateProfile => "create_profile".to_string(),
            Route::Profile => "profile".to_string(),
            Route::Search => "search".to_string(),
            Route::CourseDetail(course) => course_path("course_detail", course),
            Route::SearchCourseDetail(course) => course_path("search_course_detail", course),
            Route::Back => "..".to_string(),
        }
    }

    /// Parse a path produced by [`Route::path`]
    pub fn parse(path: &str) -> Result<Route> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let route = match segments.as_slice() {
            ["signin"] => Route::SignIn,
            ["signup"] => Route::SignUp,
            ["forgot_password"] => Route::ForgotPassword,
            ["home"] => Route::Home,
            ["create_profile"] => Route::CreateProfile,
            ["profile"] => Route::Profile,
            ["search"] => Route::Search,
            [".."] => Route::Back,
            ["course_detail", category, course] => Route::CourseDetail(course_ref(category, course)?),
            ["search_course_detail", category, course] => {
                Route::SearchCourseDetail(course_ref(category, course)?)
            }
            _ => return Err(Error::validation(format!("unknown route: {}", path))),
        };
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn course_path(prefix: &str, course: &CourseRef) -> String {
    format!(
        "{}/{}/{}",
        prefix,
        urlencoding::encode(&course.category_id),
        urlencoding::encode(&course.course_id)
    )
}

fn course_ref(category: &str, course: &str) -> Result<CourseRef> {
    let decode = |segment: &str| {
        urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .map_err(|e| Error::validation(format!("bad route segment {:?}: {}", segment, e)))
    };
    let category_id = decode(category)?;
    let course_id = decode(course)?;
    if category_id.is_empty() || course_id.is_empty() {
        return Err(Error::validation("course route needs both ids"));
    }
    Ok(CourseRef {
        category_id,
        course_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_routes_are_encoded() {
        let route = Route::CourseDetail(CourseRef::new("math & logic", "intro/1"));
        assert_eq!(route.path(), "course_detail/math%20%26%20logic/intro%2F1");
        assert_eq!(Route::parse(&route.path()).unwrap(), route);

        let search = Route::SearchCourseDetail(CourseRef::new("sci", "c1"));
        assert_eq!(search.to_string(), "search_course_detail/sci/c1");
        assert_eq!(Route::parse("search_course_detail/sci/c1").unwrap(), search);
    }

    #[test]
    fn test_plain_routes_parse() {
        for route in [
            Route::SignIn,
            Route::SignUp,
            Route::ForgotPassword,
            Route::Home,
            Route::CreateProfile,
            Route::Profile,
            Route::Search,
            Route::Back,
        ] {
            assert_eq!(Route::parse(&route.path()).unwrap(), route);
        }
        assert_eq!(Route::START, Route::SignIn);
    }

    #[test]
    fn test_unknown_routes_are_rejected() {
        assert!(Route::parse("settings").is_err());
        assert!(Route::parse("course_detail/only-one").is_err());
        assert!(Route::parse("course_detail//c1").is_err());
    }
}
