use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;
use teachease::catalog::{courses_path, load_categories, search, CATEGORIES};
use teachease::store::MemoryStore;

fn seed(store: &MemoryStore, categories: &[Vec<String>]) {
    for (i, names) in categories.iter().enumerate() {
        let category_id = format!("cat{}", i);
        store.insert(CATEGORIES, &category_id, json!({ "title": format!("Category {}", i) }));
        for (j, name) in names.iter().enumerate() {
            store.insert(
                &courses_path(&category_id),
                &format!("course{}", j),
                json!({ "courseName": name }),
            );
        }
    }
}

fn catalog() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[A-Za-z]{0,6}", 0..5), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Categories keep the listing order however the course fetches interleave
    #[test]
    fn categories_keep_listing_order(
        categories in catalog(),
        delays in prop::collection::vec(0u64..15, 6),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::new();
            seed(&store, &categories);
            for (i, delay) in delays.iter().take(categories.len()).enumerate() {
                store.set_delay(&courses_path(&format!("cat{}", i)), Duration::from_millis(*delay));
            }

            let loaded = load_categories(&store).await.unwrap();

            prop_assert_eq!(loaded.len(), categories.len());
            for (i, (category, names)) in loaded.iter().zip(&categories).enumerate() {
                prop_assert_eq!(&category.id, &format!("cat{}", i));
                let loaded_names: Vec<&String> =
                    category.courses.iter().map(|c| &c.course_name).collect();
                prop_assert_eq!(loaded_names, names.iter().collect::<Vec<_>>());
            }
            Ok(())
        })?;
    }

    /// Search returns exactly the names at or after the query, grouped by
    /// category and sorted by name within each
    #[test]
    fn search_is_a_range_filter(categories in catalog(), query in "[A-Za-z]{1,3}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = MemoryStore::new();
            seed(&store, &categories);

            let found: Vec<String> = search(&store, &query)
                .await
                .unwrap()
                .into_iter()
                .map(|c| c.course_name)
                .collect();

            let expected: Vec<String> = categories
                .iter()
                .flat_map(|names| {
                    let mut matching: Vec<String> =
                        names.iter().filter(|n| n.as_str() >= query.as_str()).cloned().collect();
                    matching.sort();
                    matching
                })
                .collect();

            prop_assert_eq!(found, expected);
            Ok(())
        })?;
    }
}
