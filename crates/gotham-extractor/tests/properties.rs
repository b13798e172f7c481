//! Property tests for the normalization pipeline

use gotham_extractor::{extract_text, parse_result, sanitize};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Arbitrary JSON values, biased towards the shapes agents produce
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".*".prop_map(Value::String),
        r#"\{"text": "[a-zA-Z .]{0,20}"(, "extras": \{.*)?"#.prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("(text|extras|type|signature)", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Text with metadata-like fragments mixed in
fn arb_answer() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z]{1,8}",
            Just(" ".to_string()),
            Just("\n\t ".to_string()),
            Just(".".to_string()),
            Just("\"extras\": {".to_string()),
            Just("extras: {".to_string()),
            Just("signature:".to_string()),
            Just("\"signature\": \"".to_string()),
        ],
        0..16,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn extract_never_panics(value in arb_json()) {
        let _ = extract_text(&value);
    }

    #[test]
    fn sanitize_never_grows(value in arb_json()) {
        let extracted = extract_text(&value);
        prop_assert!(sanitize(&extracted).len() <= extracted.len());
    }

    #[test]
    fn sanitize_is_idempotent(text in arb_answer()) {
        let once = sanitize(&text);
        prop_assert_eq!(sanitize(&once), once.clone());
    }

    #[test]
    fn sanitize_is_idempotent_on_any_text(text in ".*") {
        let once = sanitize(&text);
        prop_assert_eq!(sanitize(&once), once.clone());
    }

    #[test]
    fn parse_result_is_total(text in ".*") {
        let parsed = parse_result(&text);
        prop_assert!(!parsed.headline().is_empty());
        prop_assert!(!parsed.subtitle().is_empty());
        if parsed.role.is_some() || parsed.org.is_some() {
            prop_assert!(parsed.name.is_some());
        }
    }
}

#[test]
fn documented_examples() {
    let parsed = parse_result("We learned that Jane Doe is the CFO of Acme Corp.");
    assert_eq!(parsed.name.as_deref(), Some("Jane Doe"));
    assert_eq!(parsed.role.as_deref(), Some("CFO"));
    assert_eq!(parsed.org.as_deref(), Some("Acme Corp"));

    let parsed = parse_result("Saved to the graph: Acme Holdings.");
    assert_eq!(parsed.name.as_deref(), Some("Acme Holdings"));
    assert_eq!(parsed.role, None);
    assert_eq!(parsed.org, None);
}
