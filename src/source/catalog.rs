//! Accumulates parsed records for one run, one per derived name.

use crate::diagnostics;
use crate::record::{self, TopicRecord, ViewRecord};
use crate::source::{SourceFile, SourceKind};

use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug)]
struct Entry<T> {
    path: PathBuf,
    record: T,
}

/// Topic and view records keyed by name.
///
/// A later file that derives an already-seen name replaces the earlier record
/// (with a warning). Feeding files in sorted path order makes the winner
/// deterministic.
#[derive(Debug, Default)]
pub struct Catalog {
    topics: BTreeMap<String, Entry<TopicRecord>>,
    views: BTreeMap<String, Entry<ViewRecord>>,
}

impl Catalog {
    /// Parse every file in order, skipping the ones that fail.
    pub fn load(files: &[SourceFile]) -> Self {
        let mut catalog = Self::default();
        for file in files {
            catalog.load_file(file);
        }
        catalog
    }

    pub fn load_file(&mut self, file: &SourceFile) {
        match file.kind {
            SourceKind::Topic => {
                if let Some(topic) = record::load_topic_file(&file.path, &file.name) {
                    self.insert_topic(file.path.clone(), topic);
                }
            }
            SourceKind::View => {
                if let Some(view) = record::load_view_file(&file.path, &file.name) {
                    self.insert_view(file.path.clone(), view);
                }
            }
        }
    }

    pub fn insert_topic(&mut self, path: PathBuf, topic: TopicRecord) {
        insert(&mut self.topics, "topic", topic.name.clone(), path, topic);
    }

    pub fn insert_view(&mut self, path: PathBuf, view: ViewRecord) {
        insert(&mut self.views, "view", view.name.clone(), path, view);
    }

    pub fn topics(&self) -> impl Iterator<Item = &TopicRecord> {
        self.topics.values().map(|e| &e.record)
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewRecord> {
        self.views.values().map(|e| &e.record)
    }
}

fn insert<T>(
    map: &mut BTreeMap<String, Entry<T>>,
    kind: &str,
    name: String,
    path: PathBuf,
    record: T,
) {
    let replaced = map.insert(
        name.clone(),
        Entry {
            path: path.clone(),
            record,
        },
    );
    if let Some(prev) = replaced {
        diagnostics::warn(format!(
            "duplicate {} '{}': {} replaces {}",
            kind,
            name,
            path.display(),
            prev.path.display()
        ));
    }
}
