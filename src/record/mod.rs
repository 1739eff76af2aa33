//! Record parsers: one topic or view source file in, one normalized record out.
//!
//! Parsing is best effort. Unknown keys (of any scalar type) are ignored,
//! `<<` merge keys are resolved, and attribute values keep their scalar type.
//! Identifiers (names, schemas, tables) are coerced to text. A file whose root
//! is not a mapping (or that fails to parse at all) produces a warning on
//! stderr and no record; callers skip it and carry on with the rest of the
//! tree.

pub mod topic;
pub mod view;

pub use topic::{TopicRecord, parse_topic};
pub use view::{FieldGroup, FieldRecord, FieldType, GroupKind, ViewRecord, parse_view};

use crate::Result;
use crate::diagnostics;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Read and parse a topic file. Returns `None` (after a warning) if the file
/// cannot be read or is not a YAML mapping.
pub fn load_topic_file(path: &Path, name: &str) -> Option<TopicRecord> {
    load(path, |text| parse_topic(name, text))
}

/// Read and parse a view file. Same failure policy as [`load_topic_file`].
pub fn load_view_file(path: &Path, name: &str) -> Option<ViewRecord> {
    load(path, |text| parse_view(name, text))
}

fn load<T>(path: &Path, parse: impl FnOnce(&str) -> Result<T>) -> Option<T> {
    let parsed = fs::read_to_string(path)
        .context("read failed")
        .and_then(|text| parse(&text));

    match parsed {
        Ok(record) => Some(record),
        Err(err) => {
            diagnostics::warn(format!("could not parse {}: {:#}", path.display(), err));
            None
        }
    }
}

/// A YAML scalar attribute, kept with its JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }
}

/// Parse a YAML document whose root must be a mapping, with `<<` merge keys
/// resolved everywhere in the document.
///
/// The recognized keys are read straight off the returned mapping, so extra
/// keys of any type (`2024: note`, `true: x`) are ignored.
fn parse_root(text: &str) -> Result<Mapping> {
    let mut root: Value = serde_yaml::from_str(text)?;
    while let Value::Tagged(tagged) = root {
        root = tagged.value;
    }
    resolve_merges(&mut root)?;

    match root {
        Value::Mapping(mapping) => Ok(mapping),
        other => bail!(
            "expected a mapping at the document root, found {}",
            kind_name(&other)
        ),
    }
}

/// Fold `<<` entries into their mapping, PyYAML style: explicit keys win over
/// merged ones, earlier merge sources win over later ones, and merged keys
/// come first in the resulting order.
fn resolve_merges(value: &mut Value) -> Result<()> {
    match value {
        Value::Mapping(map) => {
            let mut sources = Vec::new();
            let mut own = Mapping::new();
            for (key, mut entry) in std::mem::take(map) {
                resolve_merges(&mut entry)?;
                if key.as_str() == Some("<<") {
                    sources = merge_sources(entry)?;
                } else {
                    own.insert(key, entry);
                }
            }

            let mut merged = Mapping::new();
            for source in sources.into_iter().rev() {
                for (key, entry) in source {
                    merged.insert(key, entry);
                }
            }
            for (key, entry) in own {
                merged.insert(key, entry);
            }
            *map = merged;
        }
        Value::Sequence(items) => {
            for item in items {
                resolve_merges(item)?;
            }
        }
        Value::Tagged(tagged) => resolve_merges(&mut tagged.value)?,
        _ => {}
    }
    Ok(())
}

fn merge_sources(value: Value) -> Result<Vec<Mapping>> {
    match value {
        Value::Mapping(mapping) => Ok(vec![mapping]),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(mapping) => Ok(mapping),
                other => bail!(
                    "merge key `<<` list entries must be mappings, found {}",
                    kind_name(&other)
                ),
            })
            .collect(),
        other => bail!(
            "merge key `<<` expects a mapping or a list of mappings, found {}",
            kind_name(&other)
        ),
    }
}

/// Keep a scalar attribute as-is. `null`, `false` and collections count as absent.
fn scalar_value(value: &Value) -> Option<Scalar> {
    match untagged(value) {
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Bool(true) => Some(Scalar::Bool(true)),
        Value::Number(n) => Some(
            json_number(n).map_or_else(|| Scalar::Text(n.to_string()), Scalar::Number),
        ),
        _ => None,
    }
}

/// `.nan` and `.inf` have no JSON number form.
fn json_number(n: &serde_yaml::Number) -> Option<serde_json::Number> {
    if let Some(i) = n.as_i64() {
        Some(i.into())
    } else if let Some(u) = n.as_u64() {
        Some(u.into())
    } else {
        n.as_f64().and_then(serde_json::Number::from_f64)
    }
}

/// Coerce a scalar identifier to text. `null`, `false` and collections count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Coerce a mapping key to text. Unlike values, `false` is a usable key.
fn key_text(key: &Value) -> Option<String> {
    match untagged(key) {
        Value::Bool(false) => Some("false".to_string()),
        other => scalar_text(other),
    }
}

/// Look through YAML tags (`!foo {...}`) at the value underneath.
fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
