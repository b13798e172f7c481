//! Console flows
//!
//! Each flow issues its backend request(s) and settles into a
//! `RequestState` the UI can render directly. Blank input never reaches
//! the backend.

use std::sync::Arc;

use gotham_core::{
    AppConfig, BackendConfig, CanonicalGraph, CompanyInsight, CompanyMood, GraphConfig,
    GraphStats, GraphSummary, MissionResponse,
};
use gotham_extractor::{ParsedResult, ResultParser};
use gotham_graph::{CanonicalStats, GraphCanonicalizer};
use serde::Serialize;
use tokio::sync::watch;

use crate::backend::ConsoleBackend;
use crate::state::RequestState;

/// A finished mission with its display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionOutcome {
    pub response: MissionResponse,
    pub parsed: ParsedResult,
    pub headline: String,
    pub subtitle: String,
}

/// Graph sample reduced for the preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPreview {
    pub summary: GraphSummary,
    pub graph: CanonicalGraph,
    pub stats: CanonicalStats,
}

/// Company lookup: insight and mood settle independently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyReport {
    pub company: String,
    pub insight: RequestState<CompanyInsight>,
    pub mood: RequestState<CompanyMood>,
}

/// Entry point for the console flows
pub struct Console {
    backend: Arc<dyn ConsoleBackend>,
    parser: ResultParser,
    canonicalizer: GraphCanonicalizer,
    doc_limit: usize,
    timeframe: String,
}

impl Console {
    /// Create a console with default settings
    pub fn new(backend: Arc<dyn ConsoleBackend>) -> Self {
        Self {
            backend,
            parser: ResultParser::new(),
            canonicalizer: GraphCanonicalizer::default(),
            doc_limit: GraphConfig::default().sample_doc_limit,
            timeframe: BackendConfig::default().mood_timeframe,
        }
    }

    /// Create from config
    pub fn from_config(backend: Arc<dyn ConsoleBackend>, config: &AppConfig) -> Self {
        Self {
            backend,
            parser: ResultParser::from_config(&config.inference),
            canonicalizer: GraphCanonicalizer::from_config(&config.graph),
            doc_limit: config.graph.sample_doc_limit,
            timeframe: config.backend.mood_timeframe.clone(),
        }
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = timeframe.into();
        self
    }

    pub fn with_doc_limit(mut self, doc_limit: usize) -> Self {
        self.doc_limit = doc_limit;
        self
    }

    /// Run a mission and parse its answer for display
    pub async fn submit_mission(
        &self,
        task: &str,
        thread_id: Option<&str>,
    ) -> RequestState<MissionOutcome> {
        if task.trim().is_empty() {
            return RequestState::Idle;
        }

        let result = self.backend.run_mission(task, thread_id).await;
        RequestState::from_result(result).map(|response| {
            let parsed = self.parser.parse(&response.result);
            MissionOutcome {
                headline: parsed.headline(),
                subtitle: parsed.subtitle(),
                parsed,
                response,
            }
        })
    }

    /// Fetch a graph sample and canonicalize it for the preview
    pub async fn graph_preview(&self) -> RequestState<GraphPreview> {
        let result = self.backend.graph_sample(self.doc_limit).await;
        RequestState::from_result(result).map(|sample| {
            let (graph, stats) = self
                .canonicalizer
                .canonicalize_with_stats(&sample.nodes, &sample.edges);
            GraphPreview {
                summary: GraphSummary::from_sample(&sample),
                graph,
                stats,
            }
        })
    }

    /// Current graph totals
    pub async fn graph_stats(&self) -> RequestState<GraphStats> {
        RequestState::from_result(self.backend.graph_stats().await)
    }

    /// Look up a company. The insight request and the optional mood request
    /// run concurrently; a failure of one leaves the other untouched.
    pub async fn company_lookup(
        &self,
        company: &str,
        thread_id: Option<&str>,
        include_mood: bool,
    ) -> CompanyReport {
        let company = company.trim();
        if company.is_empty() {
            return CompanyReport {
                company: String::new(),
                insight: RequestState::Idle,
                mood: RequestState::Idle,
            };
        }

        tracing::debug!("Dispatching company lookup (mood: {})", include_mood);
        let mood = async {
            if include_mood {
                RequestState::from_result(
                    self.backend.company_mood(company, &self.timeframe).await,
                )
            } else {
                RequestState::Idle
            }
        };
        let (insight, mood) = tokio::join!(self.backend.company_insight(company, thread_id), mood);

        CompanyReport {
            company: company.to_string(),
            insight: RequestState::from_result(insight),
            mood,
        }
    }

    /// Start a company lookup in the background and watch it settle.
    ///
    /// The first report marks every requested call `Loading`. Insight and
    /// mood then each replace their own state as soon as they finish.
    pub fn watch_company_lookup(
        self: &Arc<Self>,
        company: &str,
        thread_id: Option<&str>,
        include_mood: bool,
    ) -> watch::Receiver<CompanyReport> {
        let company = company.trim().to_string();
        if company.is_empty() {
            let (_, rx) = watch::channel(CompanyReport {
                company,
                insight: RequestState::Idle,
                mood: RequestState::Idle,
            });
            return rx;
        }

        let (tx, rx) = watch::channel(CompanyReport {
            company: company.clone(),
            insight: RequestState::Loading,
            mood: if include_mood {
                RequestState::Loading
            } else {
                RequestState::Idle
            },
        });

        tracing::debug!("Watching company lookup (mood: {})", include_mood);
        let tx = Arc::new(tx);

        let console = Arc::clone(self);
        let report = Arc::clone(&tx);
        let name = company.clone();
        let thread_id = thread_id.map(str::to_string);
        tokio::spawn(async move {
            let insight = console
                .backend
                .company_insight(&name, thread_id.as_deref())
                .await;
            report.send_modify(|r| r.insight = RequestState::from_result(insight));
        });

        if include_mood {
            let console = Arc::clone(self);
            tokio::spawn(async move {
                let mood = console
                    .backend
                    .company_mood(&company, &console.timeframe)
                    .await;
                tx.send_modify(|r| r.mood = RequestState::from_result(mood));
            });
        }

        rx
    }
}
