//! Gotham Extractor - Agent result normalization pipeline
//!
//! Turns the loosely shaped answer of an upstream agent into display text
//! and a best-effort subject triple:
//!
//! raw payload → [`extract_text`] → [`sanitize`] → [`EntityInferencer`]
//!
//! Every stage degrades to a best-effort value; nothing here returns an
//! error or panics on malformed input.

pub mod extract;
pub mod infer;
pub mod mission;
pub mod parser;
pub mod sanitize;

pub use extract::extract_text;
pub use infer::{CascadeRule, EntityInferencer, RuleKind};
pub use mission::{normalize_mission_body, normalize_result};
pub use parser::{first_sentence, parse_result, ParsedResult, ResultParser};
pub use sanitize::{sanitize, sanitize_or_original};
