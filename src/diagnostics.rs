//! stderr diagnostics shared by the scanner and the record parsers.

/// Print a non-fatal warning to stderr.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("WARN: {}", msg.as_ref());
}

/// Format a message for a fatal error carried through `anyhow`.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("ERROR: {}", msg.as_ref())
}
