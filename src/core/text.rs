//! Candidate label cleanup
//!
//! Everything here is pure and total: bad input produces an empty string,
//! never an error.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn markup_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z!][^>]*>").expect("static regex"))
}

/// Replace `-` and `_` with spaces, collapse whitespace runs, trim.
pub fn normalize(raw: &str) -> String {
    let separated = raw.replace(['-', '_'], " ");
    whitespace_run().replace_all(&separated, " ").trim().to_string()
}

/// Drop markup tags, keeping the text between them. A `<` not followed by
/// a tag name (as in `3 < 5`) is plain text.
pub fn strip_markup(raw: &str) -> String {
    markup_tag().replace_all(raw, "").into_owned()
}

/// Normalized base name of a file path, without its extension.
pub fn file_label(file_path: &str) -> String {
    Path::new(file_path)
        .file_stem()
        .map(|stem| normalize(&stem.to_string_lossy()))
        .unwrap_or_default()
}
