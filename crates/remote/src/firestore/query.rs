//! Structured query and field-path helpers.

use serde_json::{json, Value};

use super::value::encode_value;
use crate::document::{FilterOp, ListQuery};

/// Quotes a field name unless it is a simple identifier.
pub fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn op_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Equal => "EQUAL",
        FilterOp::In => "IN",
        FilterOp::ArrayContains => "ARRAY_CONTAINS",
    }
}

/// Builds the `structuredQuery` body for `runQuery`.
pub fn structured_query(collection: &str, query: &ListQuery) -> Value {
    let mut filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field_path(&f.field) },
                    "op": op_name(f.op),
                    "value": encode_value(&f.value),
                }
            })
        })
        .collect();

    let mut structured = json!({
        "from": [{ "collectionId": collection }],
    });
    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.remove(0),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }
    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }
    json!({ "structuredQuery": structured })
}
