//! Treemap model: the output node types and their assembly from parsed records.
//!
//! JSON shape:
//! {
//!   "name": "omni",
//!   "children": [
//!     { "name": "topics", "children": [TopicNode, ...] },
//!     { "name": "joins",  "children": [JoinNode, ...] },
//!     { "name": "views",  "children": [SchemaNode, ...] }
//!   ]
//! }
//!
//! Every leaf carries `value: 1`; the treemap client sizes inner nodes by
//! summing their leaves.

pub mod summary;

pub use summary::Summary;

use crate::record::{
    FieldGroup, FieldRecord, FieldType, GroupKind, Scalar, TopicRecord, ViewRecord,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ROOT_NAME: &str = "omni";

/// Weight of every leaf node.
pub const LEAF_VALUE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treemap {
    pub name: String,
    pub children: Vec<Branch>,
}

impl Treemap {
    pub fn topics(&self) -> &[TopicNode] {
        self.children
            .iter()
            .find_map(|b| match b {
                Branch::Topics(nodes) => Some(nodes.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn joins(&self) -> &[JoinNode] {
        self.children
            .iter()
            .find_map(|b| match b {
                Branch::Joins(nodes) => Some(nodes.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn schemas(&self) -> &[SchemaNode] {
        self.children
            .iter()
            .find_map(|b| match b {
                Branch::Views(nodes) => Some(nodes.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Top-level branch, rendered as `{"name": "<branch>", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "children", rename_all = "lowercase")]
pub enum Branch {
    Topics(Vec<TopicNode>),
    Joins(Vec<JoinNode>),
    Views(Vec<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    pub name: String,
    pub label: Scalar,
    pub base_view: String,
    /// Base view reference first, then one reference per joined view.
    pub children: Vec<RefNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinNode {
    pub name: String,
    pub label: Scalar,
    pub children: Vec<RefNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    BaseView,
    Join,
}

/// Leaf naming a view; not an expansion of that view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefNode {
    pub name: String,
    pub value: u32,
    pub ref_type: RefType,
}

impl RefNode {
    pub fn new(name: impl Into<String>, ref_type: RefType) -> Self {
        Self {
            name: name.into(),
            value: LEAF_VALUE,
            ref_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name: String,
    pub children: Vec<ViewNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewNode {
    pub name: String,
    pub table_name: String,
    pub children: Vec<GroupNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    pub name: GroupKind,
    pub children: Vec<FieldNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub value: u32,
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_type: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Scalar>,

    /// Only ever rendered as `true`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<&FieldRecord> for FieldNode {
    fn from(field: &FieldRecord) -> Self {
        Self {
            name: field.name.clone(),
            value: LEAF_VALUE,
            field_type: field.field_type,
            sql: field.sql.clone(),
            aggregate_type: field.aggregate_type.clone(),
            format: field.format.clone(),
            label: field.label.clone(),
            primary_key: field.primary_key,
        }
    }
}

impl From<&FieldGroup> for GroupNode {
    fn from(group: &FieldGroup) -> Self {
        Self {
            name: group.kind,
            children: group.fields.iter().map(FieldNode::from).collect(),
        }
    }
}

impl From<&ViewRecord> for ViewNode {
    fn from(view: &ViewRecord) -> Self {
        Self {
            name: view.name.clone(),
            table_name: view.table_name.clone(),
            children: view.field_groups.iter().map(GroupNode::from).collect(),
        }
    }
}

/// Assemble the three-branch treemap from all records of one scan.
///
/// - topics: every topic by name; base view ref, then join refs
/// - joins: only topics with at least one join, by name; join refs only
/// - views: one node per distinct schema (exact string match), by schema
///   name, each holding its views by name
///
/// Input order does not matter; all ordering is by ordinal string comparison.
pub fn build_treemap<'a>(
    topics: impl IntoIterator<Item = &'a TopicRecord>,
    views: impl IntoIterator<Item = &'a ViewRecord>,
) -> Treemap {
    let mut topics: Vec<&TopicRecord> = topics.into_iter().collect();
    topics.sort_by(|a, b| a.name.cmp(&b.name));

    let topic_nodes: Vec<TopicNode> = topics
        .iter()
        .map(|topic| {
            let mut children = vec![RefNode::new(&topic.base_view, RefType::BaseView)];
            children.extend(join_refs(topic));
            TopicNode {
                name: topic.name.clone(),
                label: topic.label.clone(),
                base_view: topic.base_view.clone(),
                children,
            }
        })
        .collect();

    let join_nodes: Vec<JoinNode> = topics
        .iter()
        .filter(|topic| !topic.joined_views.is_empty())
        .map(|topic| JoinNode {
            name: topic.name.clone(),
            label: topic.label.clone(),
            children: join_refs(topic).collect(),
        })
        .collect();

    let mut by_schema: BTreeMap<&str, Vec<&ViewRecord>> = BTreeMap::new();
    for view in views {
        by_schema.entry(view.schema.as_str()).or_default().push(view);
    }

    let schema_nodes: Vec<SchemaNode> = by_schema
        .into_iter()
        .map(|(schema, mut views)| {
            views.sort_by(|a, b| a.name.cmp(&b.name));
            SchemaNode {
                name: schema.to_string(),
                children: views.into_iter().map(ViewNode::from).collect(),
            }
        })
        .collect();

    Treemap {
        name: ROOT_NAME.to_string(),
        children: vec![
            Branch::Topics(topic_nodes),
            Branch::Joins(join_nodes),
            Branch::Views(schema_nodes),
        ],
    }
}

fn join_refs(topic: &TopicRecord) -> impl Iterator<Item = RefNode> + '_ {
    topic
        .joined_views
        .iter()
        .map(|view| RefNode::new(view, RefType::Join))
}
