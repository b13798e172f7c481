//! Trailing metadata removal
//!
//! Agent answers often end with serialized model metadata (`extras`
//! blocks, thought signatures). Everything from the first such marker to
//! the end of the text is dropped, then whitespace is normalized.

use once_cell::sync::Lazy;
use regex::Regex;

static EXTRAS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)"?extras"?\s*:\s*\{.*$"#).expect("extras pattern"));

static SIGNATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)"?signature"?\s*:.*$"#).expect("signature pattern"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Strip trailing metadata and collapse whitespace.
///
/// The result is never longer than the input and sanitizing twice gives
/// the same text as sanitizing once.
pub fn sanitize(text: &str) -> String {
    let text = EXTRAS_BLOCK.replace(text, "");
    let text = SIGNATURE.replace(&text, "");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// Sanitize, keeping the trimmed input when nothing but metadata would remain
pub fn sanitize_or_original(text: &str) -> String {
    let cleaned = sanitize(text);
    if cleaned.is_empty() {
        text.trim().to_string()
    } else {
        cleaned
    }
}
