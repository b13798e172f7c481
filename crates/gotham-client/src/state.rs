//! Per-request view state

use std::fmt;

use serde::Serialize;

/// Lifecycle of one backend request as the console renders it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum RequestState<T> {
    /// Not requested
    Idle,
    /// In flight
    Loading,
    Ready(T),
    /// Failed with a user-visible message
    Failed(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestState<T> {
    /// Settle a finished request
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                tracing::warn!("Request failed: {}", e);
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestState<U> {
        match self {
            Self::Idle => RequestState::Idle,
            Self::Loading => RequestState::Loading,
            Self::Ready(value) => RequestState::Ready(f(value)),
            Self::Failed(message) => RequestState::Failed(message),
        }
    }
}

impl<T> fmt::Display for RequestState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(message) => write!(f, "failed: {message}"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use serde_json::json;

    #[test]
    fn test_from_result() {
        let ok: RequestState<u32> = RequestState::from_result(Ok::<_, ClientError>(3));
        assert_eq!(ok, RequestState::Ready(3));
        assert_eq!(ok.value(), Some(&3));

        let failed: RequestState<u32> = RequestState::from_result(Err(ClientError::Status {
            status: 500,
            message: "Backend responded 500".to_string(),
        }));
        assert_eq!(failed.error(), Some("Backend responded 500"));
        assert!(!failed.is_ready());
    }

    #[test]
    fn test_default_is_idle() {
        let state: RequestState<String> = RequestState::default();
        assert_eq!(state.as_str(), "idle");
        assert_eq!(state.value(), None);
    }

    #[test]
    fn test_map_keeps_failure() {
        let state: RequestState<u32> = RequestState::Failed("boom".to_string());
        assert_eq!(state.map(|v| v * 2), RequestState::Failed("boom".to_string()));
        assert_eq!(RequestState::Ready(2).map(|v| v * 2), RequestState::Ready(4));
    }

    #[test]
    fn test_serialized_shape() {
        let ready = serde_json::to_value(RequestState::Ready(json!({"a": 1}))).unwrap();
        assert_eq!(ready, json!({"state": "ready", "value": {"a": 1}}));

        let loading = serde_json::to_value(RequestState::<u8>::Loading).unwrap();
        assert_eq!(loading, json!({"state": "loading"}));
    }
}
