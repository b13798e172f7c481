//! Composed result parsing
//!
//! `extract → sanitize → infer` as one call, plus the display fallbacks
//! the console uses for the headline and subtitle of a mission result.

use gotham_core::{value_to_string, InferenceConfig, InferredEntity};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::extract_text;
use crate::infer::EntityInferencer;
use crate::sanitize::sanitize;

/// Headline shown when neither a name nor any text is available
pub const FALLBACK_HEADLINE: &str = "Mission ingested";

/// Subtitle shown when neither a role/org nor any text is available
pub const FALLBACK_SUBTITLE: &str = "Entities and relationships have been added.";

static DEFAULT_PARSER: Lazy<ResultParser> = Lazy::new(ResultParser::new);

/// Text up to the first period, trimmed
pub fn first_sentence(text: &str) -> &str {
    text.split('.').next().unwrap_or_default().trim()
}

/// Normalized mission result ready for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    /// Sanitized answer text
    pub cleaned: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub org: Option<String>,
    /// Input text, trimmed
    pub raw: String,
}

impl ParsedResult {
    /// The inferred triple
    pub fn entity(&self) -> InferredEntity {
        InferredEntity {
            name: self.name.clone(),
            role: self.role.clone(),
            org: self.org.clone(),
        }
    }

    /// Inferred name, else the first sentence of the cleaned or raw text
    pub fn headline(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        [first_sentence(&self.cleaned), first_sentence(&self.raw)]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(FALLBACK_HEADLINE)
            .to_string()
    }

    /// "role • org", else the first sentence of the cleaned or raw text
    pub fn subtitle(&self) -> String {
        let parts: Vec<&str> = [self.role.as_deref(), self.org.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" • ");
        }
        [first_sentence(&self.cleaned), first_sentence(&self.raw)]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(|s| format!("{s}."))
            .unwrap_or_else(|| FALLBACK_SUBTITLE.to_string())
    }
}

/// Result parser holding a compiled inference cascade
#[derive(Debug, Clone, Default)]
pub struct ResultParser {
    inferencer: EntityInferencer,
}

impl ResultParser {
    pub fn new() -> Self {
        Self {
            inferencer: EntityInferencer::new(),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            inferencer: EntityInferencer::from_config(config),
        }
    }

    /// Parse a result delivered as text
    pub fn parse(&self, text: &str) -> ParsedResult {
        let raw = text.trim();
        let extracted = extract_text(&Value::String(raw.to_string()));
        self.finish(&extracted, raw)
    }

    /// Parse a result of any shape
    pub fn parse_value(&self, value: &Value) -> ParsedResult {
        match value {
            Value::String(s) => self.parse(s),
            other => {
                let extracted = extract_text(other);
                let raw = if extracted.trim().is_empty() {
                    value_to_string(other)
                } else {
                    extracted.clone()
                };
                self.finish(&extracted, raw.trim())
            }
        }
    }

    fn finish(&self, extracted: &str, raw: &str) -> ParsedResult {
        // Rules only ever see sanitized text; metadata is kept for display only
        let sanitized = sanitize(extracted);
        let entity = self.inferencer.infer(&sanitized);
        let cleaned = if sanitized.is_empty() {
            extracted.trim().to_string()
        } else {
            sanitized
        };
        tracing::debug!(
            "Parsed result: {} cleaned chars, name inferred: {}",
            cleaned.len(),
            entity.name.is_some()
        );

        ParsedResult {
            cleaned,
            name: entity.name,
            role: entity.role,
            org: entity.org,
            raw: raw.to_string(),
        }
    }
}

/// Parse with the default cascade and denylist
pub fn parse_result(text: &str) -> ParsedResult {
    DEFAULT_PARSER.parse(text)
}
