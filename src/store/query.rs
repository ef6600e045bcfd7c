//! Query builder for `runQuery` requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::filter::FilterOperator;
use crate::store::value::{encode_value, RawDocument};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASCENDING",
            SortOrder::Descending => "DESCENDING",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference {
    field_path: String,
}

#[derive(Debug, Clone, Serialize)]
struct FieldFilter {
    field: FieldReference,
    op: &'static str,
    value: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter {
    field_filter: FieldFilter,
}

#[derive(Debug, Clone, Serialize)]
struct Order {
    field: FieldReference,
    direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector {
    collection_id: String,
}

/// A single-collection structured query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i32>,
}

impl StructuredQuery {
    /// Query the collection `collection_id` under the request's parent
    pub fn new(collection_id: &str) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.to_string(),
            }],
            filter: None,
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Filter documents where `field OP value`.
    ///
    /// Inequality filters also order by the filtered field, which the
    /// backend requires before any other ordering.
    pub fn filter(mut self, field: &str, op: FilterOperator, value: &Value) -> Self {
        self.filter = Some(Filter {
            field_filter: FieldFilter {
                field: FieldReference {
                    field_path: field.to_string(),
                },
                op: op.as_str(),
                value: encode_value(value),
            },
        });
        if !matches!(op, FilterOperator::Eq) && self.order_by.is_empty() {
            self = self.order(field, SortOrder::Ascending);
        }
        self
    }

    /// Order the results by a field
    pub fn order(mut self, field: &str, direction: SortOrder) -> Self {
        self.order_by.push(Order {
            field: FieldReference {
                field_path: field.to_string(),
            },
            direction: direction.as_str(),
        });
        self
    }

    /// Limit the number of documents returned
    pub fn limit(mut self, count: i32) -> Self {
        self.limit = Some(count);
        self
    }

    /// The request body for `:runQuery`
    pub fn to_request(&self) -> Value {
        serde_json::json!({ "structuredQuery": self })
    }
}

/// One element of the `runQuery` response stream.
/// Entries without a document only report progress.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<RawDocument>,
}
