//! Output rendering.

pub mod json;

pub use json::render_treemap_json;
