//! Backend payload models
//!
//! The backend answers with loosely shaped JSON. Every model here is built
//! with a tolerant `from_value` constructor: missing or mistyped fields fall
//! back to defaults instead of failing the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{value_to_string, GraphEdge, GraphNode};

/// Number of node names shown in a graph sample summary
pub const SAMPLE_NAME_LIMIT: usize = 6;

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .map(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.is_string())
            .map(value_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

// ============================================================================
// Mission
// ============================================================================

/// Response of a mission run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionResponse {
    /// Agent answer (normalized to plain text by the extractor)
    #[serde(default)]
    pub result: String,

    /// Conversation thread
    #[serde(default)]
    pub thread_id: String,

    /// "success" or "error"
    #[serde(default)]
    pub status: String,

    /// Fields this crate does not interpret, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MissionResponse {
    /// Response carrying only a result text and status
    pub fn new(result: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            thread_id: String::new(),
            status: status.into(),
            extra: Map::new(),
        }
    }

    /// True when the backend reported success
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

// ============================================================================
// Graph Sample
// ============================================================================

/// Source document referenced by a graph sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Timestamp as the backend sent it (number or string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

impl GraphDocument {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: str_field(obj, "id"),
            url: str_field(obj, "url"),
            created_at: obj.get("created_at").filter(|v| !v.is_null()).cloned(),
        })
    }
}

/// Raw graph payload returned by the sample endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSample {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub node_count: u64,
    pub edge_count: u64,
    pub documents: Vec<GraphDocument>,

    /// Names among the first raw node entries, read before unreadable
    /// nodes are skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_names: Vec<String>,
}

impl GraphSample {
    /// Build a sample from an untyped payload. Entries that cannot be read
    /// are skipped; counters default to zero.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let items = |key: &str| {
            obj.get(key)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
        };

        let nodes: Vec<GraphNode> = items("nodes").iter().filter_map(GraphNode::from_value).collect();
        let edges: Vec<GraphEdge> = items("edges").iter().filter_map(GraphEdge::from_value).collect();
        let documents = items("documents")
            .iter()
            .filter_map(GraphDocument::from_value)
            .collect();

        let sample_names = items("nodes")
            .iter()
            .take(SAMPLE_NAME_LIMIT)
            .filter_map(|node| node.as_object()?.get("name"))
            .map(value_to_string)
            .filter(|name| !name.is_empty())
            .collect();

        let skipped = items("nodes").len() - nodes.len() + items("edges").len() - edges.len();
        if skipped > 0 {
            tracing::warn!("Skipped {} unreadable graph entries", skipped);
        }

        Self {
            node_count: obj.get("node_count").and_then(Value::as_u64).unwrap_or(0),
            edge_count: obj.get("edge_count").and_then(Value::as_u64).unwrap_or(0),
            nodes,
            edges,
            documents,
            sample_names,
        }
    }
}

/// Headline numbers and names shown next to the graph preview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: u64,
    pub edge_count: u64,
    pub sample_nodes: Vec<String>,
    pub documents: Vec<GraphDocument>,
}

impl GraphSummary {
    /// Summarize a sample: counters as reported, plus the names among the
    /// first few raw nodes
    pub fn from_sample(sample: &GraphSample) -> Self {
        Self {
            node_count: sample.node_count,
            edge_count: sample.edge_count,
            sample_nodes: sample.sample_names.clone(),
            documents: sample.documents.clone(),
        }
    }
}

// ============================================================================
// Graph Stats
// ============================================================================

/// Dedupe confidence reported for an empty graph
pub const DEFAULT_DEDUPE_CONFIDENCE: f64 = 100.0;

/// Graph totals (`GET /graph/stats`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    #[serde(default)]
    pub entities: u64,

    #[serde(default)]
    pub sources: u64,

    /// Percentage of entities left after deduplication
    #[serde(default = "default_dedupe_confidence")]
    pub dedupe_confidence: f64,

    /// Body text when the backend did not answer with JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

fn default_dedupe_confidence() -> f64 {
    DEFAULT_DEDUPE_CONFIDENCE
}

impl Default for GraphStats {
    fn default() -> Self {
        Self {
            entities: 0,
            sources: 0,
            dedupe_confidence: DEFAULT_DEDUPE_CONFIDENCE,
            raw: None,
        }
    }
}

impl GraphStats {
    /// Read stats from a decoded body. A bare string is a body that was not
    /// JSON: totals stay at zero and the text is kept in `raw`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(obj) => {
                let count = |key: &str| obj.get(key).and_then(Value::as_u64).unwrap_or(0);
                Self {
                    entities: count("entities"),
                    sources: count("sources"),
                    dedupe_confidence: obj
                        .get("dedupe_confidence")
                        .and_then(Value::as_f64)
                        .unwrap_or(DEFAULT_DEDUPE_CONFIDENCE),
                    raw: None,
                }
            }
            Value::String(text) => Self {
                raw: Some(text.clone()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

// ============================================================================
// Company Insight
// ============================================================================

/// A competitor relationship read from the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub competitor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Competitor {
    /// Read a competitor entry; entries without both a name and a reason
    /// are rejected
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let competitor = str_field(obj, "competitor")?;
        let reason = str_field(obj, "reason")?;
        Some(Self {
            competitor,
            reason: Some(reason),
            source: str_field(obj, "source"),
        })
    }

    /// Keep only usable competitor entries, in order
    pub fn filter_list(value: Option<&Value>) -> Vec<Self> {
        value
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

/// Entity related to a profiled company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
}

impl RelatedEntity {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: str_field(obj, "id"),
            name: str_field(obj, "name")?,
            labels: string_list(obj.get("labels")),
            relation_type: str_field(obj, "type"),
        })
    }
}

/// Graph profile of a company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub sources: Vec<GraphDocument>,
    #[serde(default)]
    pub related: Vec<RelatedEntity>,
}

impl EntityProfile {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let sources = obj
            .get("sources")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(GraphDocument::from_value)
                    .filter(|doc| doc.url.is_some())
                    .collect()
            })
            .unwrap_or_default();
        let related = obj
            .get("related")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(RelatedEntity::from_value).collect())
            .unwrap_or_default();

        Some(Self {
            name: str_field(obj, "name"),
            labels: string_list(obj.get("labels")),
            properties: obj
                .get("properties")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            sources,
            related,
        })
    }
}

/// Profile plus competitors for a company query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInsight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<EntityProfile>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    /// Raw agent answer of the profiling run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_result: Option<Value>,
    /// Raw agent answer of the competitor run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_result: Option<Value>,
}

impl CompanyInsight {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            profile: obj.get("profile").and_then(EntityProfile::from_value),
            competitors: Competitor::filter_list(obj.get("competitors")),
            profile_result: obj.get("profile_result").filter(|v| !v.is_null()).cloned(),
            competitor_result: obj
                .get("competitor_result")
                .filter(|v| !v.is_null())
                .cloned(),
        }
    }

    /// True when neither a profile nor competitors are available
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.competitors.is_empty()
    }
}

// ============================================================================
// Company Mood
// ============================================================================

/// Sentiment classification of a company
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    Positive,
    Neutral,
    Negative,
    #[default]
    Mixed,
    Volatile,
}

impl MoodLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
            Self::Mixed => "Mixed",
            Self::Volatile => "Volatile",
        }
    }

    /// Parse a label case-insensitively; unknown labels map to `Mixed`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => Self::Positive,
            "neutral" => Self::Neutral,
            "negative" => Self::Negative,
            "volatile" => Self::Volatile,
            _ => Self::Mixed,
        }
    }
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Headline or article backing a mood assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MoodSource {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if !url.trim().is_empty() => Some(Self {
                title: None,
                url: Some(url.trim().to_string()),
            }),
            Value::Object(obj) => {
                let source = Self {
                    title: str_field(obj, "title").or_else(|| str_field(obj, "headline")),
                    url: str_field(obj, "url"),
                };
                (source.title.is_some() || source.url.is_some()).then_some(source)
            }
            _ => None,
        }
    }
}

/// Default confidence when the payload has none
pub const DEFAULT_MOOD_CONFIDENCE: f32 = 0.5;

/// Sentiment summary for a company query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMood {
    pub label: MoodLabel,
    pub confidence: f32,
    pub drivers: Vec<String>,
    pub sources: Vec<MoodSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

impl Default for CompanyMood {
    fn default() -> Self {
        Self {
            label: MoodLabel::Mixed,
            confidence: DEFAULT_MOOD_CONFIDENCE,
            drivers: Vec::new(),
            sources: Vec::new(),
            timeframe: None,
        }
    }
}

impl CompanyMood {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let label = obj
            .get("mood_label")
            .or_else(|| obj.get("label"))
            .and_then(Value::as_str)
            .map(MoodLabel::parse_lenient)
            .unwrap_or_default();

        let confidence = obj
            .get("confidence")
            .or_else(|| obj.get("score"))
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 1.0) as f32)
            .unwrap_or(DEFAULT_MOOD_CONFIDENCE);

        let sources = obj
            .get("sources")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(MoodSource::from_value).collect())
            .unwrap_or_default();

        Self {
            label,
            confidence,
            drivers: string_list(obj.get("drivers")),
            sources,
            timeframe: str_field(obj, "timeframe"),
        }
    }

    /// True when the payload carried nothing to explain the label
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty() && self.sources.is_empty()
    }
}
