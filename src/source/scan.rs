//! Recursive directory walk for `*.topic.yaml` and `*.view.yaml` files.

use crate::Result;
use crate::diagnostics;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOPIC_SUFFIX: &str = ".topic.yaml";
pub const VIEW_SUFFIX: &str = ".view.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Topic,
    View,
}

/// A discovered source file and the record name derived from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub kind: SourceKind,
    pub name: String,
    pub path: PathBuf,
}

impl SourceFile {
    /// Classify `path` by its (case-sensitive) file-name suffix.
    pub fn classify(path: &Path) -> Option<SourceFile> {
        let file_name = path.file_name()?.to_str()?;

        let (kind, name) = if let Some(name) = file_name.strip_suffix(VIEW_SUFFIX) {
            (SourceKind::View, name)
        } else if let Some(name) = file_name.strip_suffix(TOPIC_SUFFIX) {
            (SourceKind::Topic, name)
        } else {
            return None;
        };

        Some(SourceFile {
            kind,
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Collect every topic and view file under `root`, at any depth, sorted by path.
///
/// Failing to read `root` itself is an error. Unreadable subdirectories are
/// reported and skipped. Symlinked directories are not followed.
pub fn find_source_files(root: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<SourceFile>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| {
        diagnostics::error_message(format!("read directory {}", dir.display()))
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                diagnostics::warn(format!("skipping entry in {}: {}", dir.display(), err));
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if is_dir {
            if let Err(err) = walk(&path, files) {
                diagnostics::warn(format!("skipping {}: {:#}", path.display(), err));
            }
        } else if let Some(source) = SourceFile::classify(&path) {
            files.push(source);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}\n").unwrap();
    }

    #[test]
    fn classify_by_suffix() {
        let topic = SourceFile::classify(Path::new("model/orders.topic.yaml")).unwrap();
        assert_eq!(topic.kind, SourceKind::Topic);
        assert_eq!(topic.name, "orders");

        let view = SourceFile::classify(Path::new("sales/orders_view.view.yaml")).unwrap();
        assert_eq!(view.kind, SourceKind::View);
        assert_eq!(view.name, "orders_view");
    }

    #[test]
    fn classify_is_case_sensitive_and_strict() {
        for path in [
            "orders.Topic.yaml",
            "orders.view.yml",
            "orders.yaml",
            "orders.view.yaml.bak",
            "model_file.yaml",
        ] {
            assert_eq!(SourceFile::classify(Path::new(path)), None, "{}", path);
        }
    }

    #[test]
    fn classify_strips_only_the_trailing_suffix() {
        let view = SourceFile::classify(Path::new("a.view.yaml.view.yaml")).unwrap();
        assert_eq!(view.name, "a.view.yaml");
    }

    #[test]
    fn walk_finds_nested_files_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "z.topic.yaml");
        touch(dir.path(), "b/deep/er/c.view.yaml");
        touch(dir.path(), "a/b.view.yaml");
        touch(dir.path(), "a/notes.md");
        touch(dir.path(), "model.yaml");

        let files = find_source_files(dir.path()).unwrap();
        let rel: Vec<PathBuf> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a/b.view.yaml"),
                PathBuf::from("b/deep/er/c.view.yaml"),
                PathBuf::from("z.topic.yaml"),
            ]
        );
    }

    #[test]
    fn walk_of_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_source_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn walk_of_empty_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_source_files(dir.path()).unwrap().is_empty());
    }
}
