//! Backend access
//!
//! Every response body is read as text first and decoded as JSON when
//! possible; bodies that are not JSON become a raw string value.

use std::time::Duration;

use async_trait::async_trait;
use gotham_core::{
    BackendConfig, CompanyInsight, CompanyMood, GraphSample, GraphStats, MissionResponse,
};
use gotham_extractor::normalize_mission_body;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{ClientError, Result};

/// Message shown when a failed mission carries no body
const MISSION_FAILED: &str = "Mission failed";

/// Decode a response body as JSON, falling back to the raw text
pub fn decode_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Calls the console makes against the agent backend
#[async_trait]
pub trait ConsoleBackend: Send + Sync {
    /// Run a free-text mission (`POST /run-mission`)
    async fn run_mission(&self, task: &str, thread_id: Option<&str>) -> Result<MissionResponse>;

    /// Fetch a sample of the knowledge graph (`GET /graph/sample`)
    async fn graph_sample(&self, doc_limit: usize) -> Result<GraphSample>;

    /// Entity and source totals (`GET /graph/stats`)
    async fn graph_stats(&self) -> Result<GraphStats>;

    /// Profile and competitors of a company (`POST /agents/company-insight`)
    async fn company_insight(&self, company: &str, thread_id: Option<&str>)
        -> Result<CompanyInsight>;

    /// Sentiment of a company over a timeframe (`POST /agents/company-mood`)
    async fn company_mood(&self, company: &str, timeframe: &str) -> Result<CompanyMood>;
}

// ============================================================================
// HTTP Backend
// ============================================================================

#[derive(Debug, Serialize)]
struct MissionRequest<'a> {
    task: &'a str,
    thread_id: String,
}

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    company: &'a str,
    thread_id: String,
}

#[derive(Debug, Serialize)]
struct MoodRequest<'a> {
    company: &'a str,
    timeframe: &'a str,
}

/// reqwest-backed client for the agent backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpBackend {
    /// Create a client without a timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Create from config; a timeout of zero seconds disables it
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone()).with_timeout(
            config
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        )
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Send a request and read the whole body, bounded by the timeout
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| ClientError::Request(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| ClientError::Request(format!("Failed to read body: {e}")))?;
            Ok::<_, ClientError>((status, text))
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ClientError::Timeout(limit.as_millis() as u64))?,
            None => exchange.await,
        }
    }
}

/// Error for a non-success status: the backend's `detail` when it sent one,
/// otherwise a generic message naming the status
fn status_error(status: StatusCode, body: &str) -> ClientError {
    let detail = match decode_body(body) {
        Value::Object(obj) => obj
            .get("detail")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    };
    ClientError::status(
        status.as_u16(),
        detail.unwrap_or_else(|| format!("Backend responded {}", status.as_u16())),
    )
}

fn thread_or_new(thread_id: Option<&str>) -> String {
    thread_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[async_trait]
impl ConsoleBackend for HttpBackend {
    async fn run_mission(&self, task: &str, thread_id: Option<&str>) -> Result<MissionResponse> {
        let request = MissionRequest {
            task,
            thread_id: thread_or_new(thread_id),
        };
        tracing::info!("Running mission on thread {}", request.thread_id);

        let (status, body) = self
            .send(self.client.post(self.url("run-mission")).json(&request))
            .await?;

        if !status.is_success() {
            let text = body.trim();
            let message = if text.is_empty() { MISSION_FAILED } else { text };
            tracing::warn!("Mission failed with status {}", status);
            return Err(ClientError::status(status.as_u16(), message));
        }

        Ok(normalize_mission_body(&body, true))
    }

    async fn graph_sample(&self, doc_limit: usize) -> Result<GraphSample> {
        tracing::info!("Fetching graph sample (doc_limit={})", doc_limit);

        let request = self
            .client
            .get(self.url("graph/sample"))
            .query(&[("doc_limit", doc_limit)]);
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            return Err(ClientError::status(
                status.as_u16(),
                format!("Backend responded {}", status.as_u16()),
            ));
        }

        match decode_body(&body) {
            value @ Value::Object(_) => Ok(GraphSample::from_value(&value)),
            _ => Err(ClientError::Decode(
                "graph sample is not a JSON object".to_string(),
            )),
        }
    }

    async fn graph_stats(&self) -> Result<GraphStats> {
        let (status, body) = self.send(self.client.get(self.url("graph/stats"))).await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        let stats = GraphStats::from_value(&decode_body(&body));
        if stats.raw.is_some() {
            tracing::warn!("Graph stats body was not JSON, using defaults");
        }
        Ok(stats)
    }

    async fn company_insight(
        &self,
        company: &str,
        thread_id: Option<&str>,
    ) -> Result<CompanyInsight> {
        let request = InsightRequest {
            company,
            thread_id: thread_or_new(thread_id),
        };
        tracing::info!("Requesting insight for {}", company);

        let (status, body) = self
            .send(
                self.client
                    .post(self.url("agents/company-insight"))
                    .json(&request),
            )
            .await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(CompanyInsight::from_value(&decode_body(&body)))
    }

    async fn company_mood(&self, company: &str, timeframe: &str) -> Result<CompanyMood> {
        let request = MoodRequest { company, timeframe };
        tracing::info!("Requesting mood for {} over {}", company, timeframe);

        let (status, body) = self
            .send(self.client.post(self.url("agents/company-mood")).json(&request))
            .await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(CompanyMood::from_value(&decode_body(&body)))
    }
}
