//! Filter operations for store queries

use std::cmp::Ordering;

use serde_json::Value;

/// Operator for field filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Less than
    Lt,

    /// Less than or equal to
    Lte,

    /// Greater than
    Gt,

    /// Greater than or equal to
    Gte,

    /// Equal to
    Eq,

    /// Not equal to
    Neq,
}

impl FilterOperator {
    /// Convert the operator to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Lt => "LESS_THAN",
            FilterOperator::Lte => "LESS_THAN_OR_EQUAL",
            FilterOperator::Gt => "GREATER_THAN",
            FilterOperator::Gte => "GREATER_THAN_OR_EQUAL",
            FilterOperator::Eq => "EQUAL",
            FilterOperator::Neq => "NOT_EQUAL",
        }
    }

    /// Whether `field OP value` holds.
    ///
    /// Values of different types never match, mirroring the backend, which
    /// only compares values of the same type.
    pub fn matches(&self, field: &Value, value: &Value) -> bool {
        let Some(ordering) = compare_values(field, value) else {
            return false;
        };
        match self {
            FilterOperator::Lt => ordering == Ordering::Less,
            FilterOperator::Lte => ordering != Ordering::Greater,
            FilterOperator::Gt => ordering == Ordering::Greater,
            FilterOperator::Gte => ordering != Ordering::Less,
            FilterOperator::Eq => ordering == Ordering::Equal,
            FilterOperator::Neq => ordering != Ordering::Equal,
        }
    }
}

/// Order two values of the same type. Strings compare by their UTF-8 bytes.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
