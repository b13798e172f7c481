//! Gotham Client - Backend access for the console
//!
//! This crate talks to the agent backend and turns its responses into the
//! states the console renders:
//! - `ConsoleBackend`: the backend calls behind one async trait
//! - `HttpBackend`: reqwest implementation with an optional per-request timeout
//! - `RequestState`: idle / loading / ready / failed, one per request
//!   (`Console::watch_company_lookup` publishes the loading phase)
//! - `Console`: mission, graph preview, graph stats and company lookup flows

use thiserror::Error;

pub mod backend;
pub mod console;
pub mod state;

pub use backend::{decode_body, ConsoleBackend, HttpBackend};
pub use console::{CompanyReport, Console, GraphPreview, MissionOutcome};
pub use state::RequestState;

// ============================================================================
// Error Types
// ============================================================================

/// Failure of a backend request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Non-success HTTP status; `message` is what the user sees
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub(crate) fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
