//! Topic sources (`*.topic.yaml`).
//!
//! Shape:
//! ```yaml
//! label: Orders                # optional, defaults to the topic name
//! base_view: orders_view       # optional, defaults to the topic name
//! joins:                       # optional nested mapping of view names
//!   customers_view:
//!     addresses_view: {}
//!   products_view: {}
//! ```

use super::{Scalar, key_text, parse_root, scalar_text, scalar_value, untagged};
use crate::Result;

use serde_yaml::{Mapping, Value};

/// A parsed topic. `name` comes from the file name, never from the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRecord {
    pub name: String,
    /// Kept with its YAML scalar type (`label: 2024` stays a number).
    pub label: Scalar,
    pub base_view: String,
    /// Every view reachable through `joins`, in pre-order. Duplicates are kept.
    pub joined_views: Vec<String>,
}

/// Parse the text of a topic file named `name`.
pub fn parse_topic(name: &str, text: &str) -> Result<TopicRecord> {
    let root = parse_root(text)?;

    let label = root
        .get("label")
        .and_then(scalar_value)
        .unwrap_or_else(|| Scalar::text(name));
    let base_view = root
        .get("base_view")
        .and_then(scalar_text)
        .unwrap_or_else(|| name.to_string());
    let joined_views = match root.get("joins").map(untagged) {
        Some(Value::Mapping(joins)) => flatten_joins(joins),
        _ => Vec::new(),
    };

    Ok(TopicRecord {
        name: name.to_string(),
        label,
        base_view,
        joined_views,
    })
}

/// Flatten a nested join mapping depth-first: each key is emitted, then the
/// flattening of its value if that value is itself a mapping.
///
/// `{a: {b: {}}, c: {}}` flattens to `[a, b, c]`. Keys that are not scalars
/// are skipped together with everything nested under them.
pub fn flatten_joins(joins: &Mapping) -> Vec<String> {
    let mut out = Vec::new();
    flatten_into(joins, &mut out);
    out
}

fn flatten_into(joins: &Mapping, out: &mut Vec<String>) {
    for (key, nested) in joins {
        let Some(view) = key_text(key) else {
            continue;
        };
        out.push(view);
        if let Value::Mapping(nested) = untagged(nested) {
            flatten_into(nested, out);
        }
    }
}
