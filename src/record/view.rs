//! View sources (`*.view.yaml`).
//!
//! Shape:
//! ```yaml
//! schema: sales                # optional, defaults to UNKNOWN
//! table_name: ORDERS           # optional, defaults to the upper-cased view name
//! dimensions:
//!   id:
//!     primary_key: true
//!     sql: '"ID"'
//! measures:
//!   total:
//!     aggregate_type: sum
//!     format: usdcurrency
//! ```

use super::{Scalar, key_text, parse_root, scalar_text, scalar_value, untagged};
use crate::Result;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Schema assigned to views that do not declare one.
pub const UNKNOWN_SCHEMA: &str = "UNKNOWN";

/// The two field groups a view can declare, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Dimensions,
    Measures,
}

impl GroupKind {
    pub const ALL: [GroupKind; 2] = [GroupKind::Dimensions, GroupKind::Measures];

    /// Singular form carried by each field of the group.
    pub fn field_type(self) -> FieldType {
        match self {
            GroupKind::Dimensions => FieldType::Dimension,
            GroupKind::Measures => FieldType::Measure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Dimension,
    Measure,
}

/// One dimension or measure. Absent attributes stay `None` and present ones
/// keep their YAML scalar type; `primary_key` is true only for an explicit
/// YAML `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub name: String,
    pub field_type: FieldType,
    pub sql: Option<Scalar>,
    pub aggregate_type: Option<Scalar>,
    pub format: Option<Scalar>,
    pub label: Option<Scalar>,
    pub primary_key: bool,
}

impl FieldRecord {
    /// A field with no metadata.
    pub fn bare(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            sql: None,
            aggregate_type: None,
            format: None,
            label: None,
            primary_key: false,
        }
    }
}

/// A non-empty group of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    pub kind: GroupKind,
    pub fields: Vec<FieldRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    pub name: String,
    pub schema: String,
    pub table_name: String,
    /// Dimensions before measures; empty groups are left out.
    pub field_groups: Vec<FieldGroup>,
}

impl ViewRecord {
    pub fn field_count(&self) -> usize {
        self.field_groups.iter().map(|g| g.fields.len()).sum()
    }
}

fn group_key(kind: GroupKind) -> &'static str {
    match kind {
        GroupKind::Dimensions => "dimensions",
        GroupKind::Measures => "measures",
    }
}

/// Parse the text of a view file named `name`.
pub fn parse_view(name: &str, text: &str) -> Result<ViewRecord> {
    let root = parse_root(text)?;

    let schema = root
        .get("schema")
        .and_then(scalar_text)
        .unwrap_or_else(|| UNKNOWN_SCHEMA.to_string());
    let table_name = root
        .get("table_name")
        .and_then(scalar_text)
        .unwrap_or_else(|| name.to_uppercase());

    let field_groups = GroupKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let Value::Mapping(fields) = untagged(root.get(group_key(kind))?) else {
                return None;
            };
            let fields = parse_fields(kind, fields);
            (!fields.is_empty()).then_some(FieldGroup { kind, fields })
        })
        .collect();

    Ok(ViewRecord {
        name: name.to_string(),
        schema,
        table_name,
        field_groups,
    })
}

fn parse_fields(kind: GroupKind, fields: &Mapping) -> Vec<FieldRecord> {
    fields
        .iter()
        .filter_map(|(key, meta)| {
            let name = key_text(key)?;
            Some(parse_field(name, kind.field_type(), meta))
        })
        .collect()
}

fn parse_field(name: String, field_type: FieldType, meta: &Value) -> FieldRecord {
    // `id:` or `id: some text` declares the field with no metadata.
    let Value::Mapping(meta) = untagged(meta) else {
        return FieldRecord::bare(name, field_type);
    };
    let attr = |key: &str| meta.get(key).and_then(scalar_value);

    FieldRecord {
        sql: attr("sql"),
        aggregate_type: attr("aggregate_type"),
        format: attr("format"),
        label: attr("label"),
        primary_key: matches!(meta.get("primary_key").map(untagged), Some(Value::Bool(true))),
        ..FieldRecord::bare(name, field_type)
    }
}
