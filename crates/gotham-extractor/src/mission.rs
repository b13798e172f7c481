//! Mission response normalization
//!
//! The backend returns the agent's answer untouched in `result`. Before the
//! console sees it, `result` is reduced to plain text so every consumer can
//! treat it as a string.

use gotham_core::{value_to_string, MissionResponse};
use serde_json::Value;

use crate::extract::extract_text;
use crate::sanitize::sanitize_or_original;

/// Reduce a raw agent result to sanitized text
pub fn normalize_result(raw: &Value) -> String {
    sanitize_or_original(&extract_text(raw))
}

/// Normalize a mission response body.
///
/// `success` is the HTTP outcome of the request; it decides the status of
/// bodies that do not carry one.
pub fn normalize_mission_body(body: &str, success: bool) -> MissionResponse {
    let fallback_status = if success { "success" } else { "error" };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut obj)) => {
            let result = obj.remove("result").unwrap_or(Value::Null);
            let thread_id = obj
                .remove("thread_id")
                .map(|v| value_to_string(&v))
                .unwrap_or_default();
            let status = obj
                .remove("status")
                .map(|v| value_to_string(&v))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback_status.to_string());

            MissionResponse {
                result: normalize_result(&result),
                thread_id,
                status,
                extra: obj,
            }
        }
        Ok(other) => {
            tracing::debug!("Mission body is JSON but not an object");
            MissionResponse::new(normalize_result(&other), fallback_status)
        }
        Err(_) => {
            tracing::debug!("Mission body is not JSON, passing it through as text");
            MissionResponse::new(body, fallback_status)
        }
    }
}
