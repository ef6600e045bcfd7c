//! Categories and courses

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::Document;

pub const UNTITLED_CATEGORY: &str = "Untitled Category";
pub const UNNAMED_COURSE: &str = "Unnamed Course";

/// A category with its courses, in backend order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub courses: Vec<Course>,
}

/// Stable identity of a course: the document ids of its category and itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseRef {
    pub category_id: String,
    pub course_id: String,
}

impl CourseRef {
    pub fn new(category_id: &str, course_id: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            course_id: course_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub category_id: String,
    pub course_name: String,
    pub course_description: String,
    /// Possibly empty
    pub image_url: String,
}

impl Course {
    /// Decode a course document. Absent fields take their defaults; a field
    /// holding a non-string value fails the whole document.
    pub fn from_document(category_id: &str, doc: &Document) -> Result<Self> {
        Ok(Self {
            id: doc.id.clone(),
            category_id: category_id.to_string(),
            course_name: doc.string_or("courseName", UNNAMED_COURSE)?,
            course_description: doc.string_or("courseDescription", "")?,
            image_url: doc.string_or("imageUrl", "")?,
        })
    }

    pub fn reference(&self) -> CourseRef {
        CourseRef::new(&self.category_id, &self.id)
    }

    /// The first `max_chars` characters of the description
    pub fn preview(&self, max_chars: usize) -> String {
        self.course_description.chars().take(max_chars).collect()
    }

    /// The description with its HTML markup rendered to plain text
    pub fn description_text(&self) -> String {
        html_to_text(&self.course_description)
    }
}

static BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>|</li\s*>").expect("valid regex"));
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Render simple HTML as plain text.
///
/// Line-ending tags become newlines, other tags are dropped and the common
/// entities are decoded. `&amp;` is decoded last so `&amp;lt;` stays `&lt;`.
pub fn html_to_text(html: &str) -> String {
    let text = BREAKS.replace_all(html, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default() {
        let doc = Document::from_json("c1", json!({}));
        let course = Course::from_document("math", &doc).unwrap();
        assert_eq!(course.course_name, UNNAMED_COURSE);
        assert_eq!(course.course_description, "");
        assert_eq!(course.image_url, "");
        assert_eq!(course.reference(), CourseRef::new("math", "c1"));
    }

    #[test]
    fn test_wrongly_typed_field_fails_the_document() {
        let doc = Document::from_json("c1", json!({ "courseName": 42 }));
        assert!(Course::from_document("math", &doc).is_err());
    }

    #[test]
    fn test_preview_counts_characters() {
        let doc = Document::from_json("c1", json!({ "courseDescription": "héllo wörld" }));
        let course = Course::from_document("x", &doc).unwrap();
        assert_eq!(course.preview(5), "héllo");
        assert_eq!(course.preview(100), "héllo wörld");
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<p>Learn <b>fractions</b> &amp; decimals</p><p>Week 1<br/>Week 2</p>"),
            "Learn fractions & decimals\nWeek 1\nWeek 2"
        );
        assert_eq!(html_to_text("a &lt;tag&gt; &amp;lt;"), "a <tag> &lt;");
        assert_eq!(html_to_text("plain"), "plain");
    }
}
