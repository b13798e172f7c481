//! Gotham Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults suited to a local backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Agent backend connection
    pub backend: BackendConfig,

    /// Graph preview settings
    pub graph: GraphConfig,

    /// Entity inference settings
    pub inference: InferenceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Backend
        if let Some(url) = lookup("GOTHAM_API_BASE") {
            self.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("GOTHAM_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_value("GOTHAM_REQUEST_TIMEOUT_SECS", &secs)?;
            // Zero disables the timeout
            self.backend.request_timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(timeframe) = lookup("GOTHAM_MOOD_TIMEFRAME") {
            self.backend.mood_timeframe = timeframe;
        }

        // Graph
        if let Some(max) = lookup("GOTHAM_GRAPH_MAX_NODES") {
            self.graph.max_nodes = parse_value("GOTHAM_GRAPH_MAX_NODES", &max)?;
        }
        if let Some(limit) = lookup("GOTHAM_DOC_LIMIT") {
            self.graph.sample_doc_limit = parse_value("GOTHAM_DOC_LIMIT", &limit)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json_format = parse_value("LOG_JSON", &json)?;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Agent backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the agent backend
    pub base_url: String,

    /// Per-request timeout in seconds; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Lookback window sent with mood requests
    pub mood_timeframe: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            request_timeout_secs: Some(180),
            mood_timeframe: "90d".to_string(),
        }
    }
}

/// Graph preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum number of nodes handed to the renderer
    pub max_nodes: usize,

    /// Number of recent documents requested for a graph sample
    pub sample_doc_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_nodes: 60,
            sample_doc_limit: 6,
        }
    }
}

/// Entity inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Capitalized phrases never reported as a subject name
    pub denylist: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            denylist: vec!["Project Gotham".to_string(), "Mission Console".to_string()],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
