//! Answer text extraction
//!
//! Agents answer with a bare string, a list of content blocks, an object
//! carrying a `text` field, or a JSON document serialized into a string
//! (sometimes truncated or followed by metadata). Extraction tries the
//! highest-fidelity reading first and falls through to looser ones.

use gotham_core::value_to_string;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `"text": "..."` fragment, terminated by a metadata key, a closing brace
/// or end of input
static TEXT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)"text"\s*:\s*"(.*?)"\s*(?:,\s*"extras"|,\s*"signature"|\}|$)"#)
        .expect("text field pattern")
});

/// Key that introduces trailing model metadata
const EXTRAS_MARKER: &str = "\"extras\"";

/// Extract the plain-text answer from an arbitrarily shaped payload.
///
/// Always returns a string; an unreadable payload yields the empty string.
pub fn extract_text(raw: &Value) -> String {
    match raw {
        Value::Array(items) => from_blocks(items),
        Value::String(s) => from_str(s),
        Value::Object(obj) => obj.get("text").map(value_to_string).unwrap_or_default(),
        _ => String::new(),
    }
}

/// First block with a `text` field wins, then the first bare string
fn from_blocks(items: &[Value]) -> String {
    for item in items {
        match item {
            Value::Object(obj) => {
                if let Some(text) = obj.get("text") {
                    return value_to_string(text);
                }
            }
            Value::String(s) => return s.clone(),
            _ => {}
        }
    }
    String::new()
}

fn from_str(input: &str) -> String {
    let trimmed = input.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(obj)) => {
                if let Some(text) = obj.get("text") {
                    return value_to_string(text);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Result is not valid JSON ({}), using pattern fallback", e);
            }
        }
    }

    if let Some(text) = text_fragment(trimmed) {
        return text;
    }

    if let Some(idx) = trimmed.find(EXTRAS_MARKER) {
        return trimmed[..idx]
            .trim_start_matches(|c: char| c == '{' || c == ',' || c.is_whitespace())
            .trim()
            .to_string();
    }

    trimmed.to_string()
}

/// Locate a `"text": "..."` fragment and unescape it as a JSON string
/// literal; the raw capture is kept when it is not a valid literal
fn text_fragment(input: &str) -> Option<String> {
    let captured = TEXT_FIELD.captures(input)?.get(1)?.as_str();
    let unescaped = serde_json::from_str::<String>(&format!("\"{captured}\""))
        .unwrap_or_else(|_| captured.to_string());
    Some(unescaped)
}
