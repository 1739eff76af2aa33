//! Source discovery and accumulation.
//!
//! `scan` walks the model directory and classifies files by suffix; `catalog`
//! parses them in path order and keeps one record per derived name.

pub mod catalog;
pub mod scan;

pub use catalog::Catalog;
pub use scan::{SourceFile, SourceKind, find_source_files};
