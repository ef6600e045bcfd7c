//! Category aggregation, course search and course lookup

mod types;

use futures_util::future::try_join_all;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::store::{Document, FilterOperator, Store};

pub use types::*;

/// Top-level collection of categories
pub const CATEGORIES: &str = "categories";

/// Path of a category's course sub-collection
pub fn courses_path(category_id: &str) -> String {
    format!("{}/{}/courses", CATEGORIES, category_id)
}

/// Decode course documents, skipping the ones that cannot be decoded
fn decode_courses(category_id: &str, docs: &[Document]) -> Vec<Course> {
    docs.iter()
        .filter_map(|doc| match Course::from_document(category_id, doc) {
            Ok(course) => Some(course),
            Err(e) => {
                warn!("Error parsing course {}/{}: {}", category_id, doc.id, e);
                None
            }
        })
        .collect()
}

fn category_title(doc: &Document) -> String {
    match doc.get_string("title") {
        Ok(title) => title.unwrap_or(UNTITLED_CATEGORY).to_string(),
        Err(e) => {
            warn!("Error parsing category title: {}", e);
            UNTITLED_CATEGORY.to_string()
        }
    }
}

/// Load every category with its courses.
///
/// The course sub-queries run concurrently; results are joined back by
/// position, so categories come out in the order of the top-level listing.
/// Undecodable course documents are skipped. Any store failure aborts the
/// whole load.
pub async fn load_categories(store: &dyn Store) -> Result<Vec<Category>> {
    let category_docs = store
        .list_documents(CATEGORIES)
        .await
        .map_err(Error::into_fetch)
        .inspect_err(|e| error!("Error fetching categories: {}", e))?;
    debug!("Categories found: {}", category_docs.len());

    let fetches = category_docs.iter().map(|doc| async move {
        let title = category_title(doc);
        debug!("Fetching courses for category: {} (ID: {})", title, doc.id);

        let course_docs = store.list_documents(&courses_path(&doc.id)).await?;
        Ok::<_, Error>(Category {
            id: doc.id.clone(),
            title,
            courses: decode_courses(&doc.id, &course_docs),
        })
    });

    let categories = try_join_all(fetches)
        .await
        .map_err(Error::into_fetch)
        .inspect_err(|e| error!("Error fetching courses: {}", e))?;
    debug!("Total categories loaded: {}", categories.len());

    Ok(categories)
}

/// Find courses whose name sorts at or after `query`, across all categories.
///
/// This is a lexicographic range filter (`courseName >= query`), not a
/// substring match: `"Zoology"` matches `"Sci"`, `"Art"` does not. Results
/// are flattened in category order, each category's matches ordered by name.
/// An empty query returns nothing without touching the store.
pub async fn search(store: &dyn Store, query: &str) -> Result<Vec<Course>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let category_docs = store
        .list_documents(CATEGORIES)
        .await
        .map_err(Error::into_fetch)
        .inspect_err(|e| error!("Error fetching categories: {}", e))?;

    let lookups = category_docs.iter().map(|doc| async move {
        let docs = store
            .query_range(
                &courses_path(&doc.id),
                "courseName",
                FilterOperator::Gte,
                Value::String(query.to_string()),
            )
            .await?;
        Ok::<_, Error>(decode_courses(&doc.id, &docs))
    });

    let courses: Vec<Course> = try_join_all(lookups)
        .await
        .map_err(Error::into_fetch)
        .inspect_err(|e| error!("Error searching courses for {:?}: {}", query, e))?
        .into_iter()
        .flatten()
        .collect();
    debug!("Search {:?} matched {} courses", query, courses.len());

    Ok(courses)
}

/// Resolve a course from its reference
pub async fn load_course(store: &dyn Store, course: &CourseRef) -> Result<Course> {
    let doc = store
        .get_document(&courses_path(&course.category_id), &course.course_id)
        .await
        .map_err(Error::into_fetch)?
        .ok_or_else(|| {
            Error::not_found(format!(
                "course {}/{}",
                course.category_id, course.course_id
            ))
        })?;

    Course::from_document(&course.category_id, &doc)
}
