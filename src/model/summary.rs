//! Run summary printed after the tree is assembled.

use crate::model::Treemap;

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub topics: usize,
    /// Join references across all topics, duplicates included.
    pub joins: usize,
    pub schemas: usize,
    pub views: usize,
    pub fields: usize,
}

impl Summary {
    pub fn of(tree: &Treemap) -> Self {
        let schemas = tree.schemas();
        let views = schemas.iter().flat_map(|s| &s.children);

        Self {
            topics: tree.topics().len(),
            joins: tree.joins().iter().map(|j| j.children.len()).sum(),
            schemas: schemas.len(),
            views: views.clone().count(),
            fields: views
                .flat_map(|v| &v.children)
                .map(|g| g.children.len())
                .sum(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} topic(s), {} join(s), {} schema(s), {} view(s), {} field(s)",
            self.topics, self.joins, self.schemas, self.views, self.fields
        )
    }
}
