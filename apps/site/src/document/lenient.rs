//! Lenient JSON: hand-edited documents may carry comments and trailing commas.
//!
//! Normalization is three regex passes, then a strict `serde_json` parse. The
//! line-comment pass is a heuristic, not a tokenizer: a `//` inside a string value
//! that is not preceded by `:` or `\` is treated as a comment (`"a//b"` loses `//b"`).

use std::sync::OnceLock;

use regex::Regex;

use crate::document::model::Document;
use crate::document::DocumentError;

fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex must compile"))
}

fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)(^|[^:\\])//.*$").expect("line comment regex must compile")
    })
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("trailing comma regex must compile"))
}

/// Strips block comments, line comments and trailing commas.
pub fn normalize_lenient(raw: &str) -> String {
    let without_blocks = block_comment_re().replace_all(raw, "");
    let without_lines = line_comment_re().replace_all(&without_blocks, "${1}");
    trailing_comma_re()
        .replace_all(&without_lines, "${1}")
        .into_owned()
}

/// Parses a lenient JSON document into a [`Document`].
pub fn parse_lenient(raw: &str) -> Result<Document, DocumentError> {
    let normalized = normalize_lenient(raw);
    serde_json::from_str(&normalized).map_err(DocumentError::Malformed)
}

/// Parses a lenient JSON blob without imposing the document shape.
///
/// Used by the source listing, which only needs `meta` and must not reject a
/// document whose `data` is broken.
pub fn parse_lenient_value(raw: &str) -> Result<serde_json::Value, DocumentError> {
    serde_json::from_str(&normalize_lenient(raw)).map_err(DocumentError::Malformed)
}
