//! Gotham Core - Domain models, payload types and shared configuration
//!
//! This crate defines the types shared by the console pipelines:
//! - Graph models (nodes, edges, canonical graphs)
//! - Inferred entity triples
//! - Backend payloads (mission results, graph samples and stats, insight, mood)
//! - Configuration management

pub mod config;
pub mod payload;

pub use config::{
    AppConfig, BackendConfig, ConfigError, GraphConfig, InferenceConfig, LoggingConfig,
};
pub use payload::{
    CompanyInsight, CompanyMood, Competitor, EntityProfile, GraphDocument, GraphSample,
    GraphStats, GraphSummary, MissionResponse, MoodLabel, MoodSource, RelatedEntity,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Value Coercion
// ============================================================================

/// Coerce an arbitrary JSON value into display text.
///
/// Strings are returned verbatim, `null` becomes the empty string, scalars
/// use their display form and containers are rendered as compact JSON.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Read an identifier that may arrive as a JSON string or number
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value)
        .ok_or_else(|| serde::de::Error::custom("identifier must be a string or a number"))
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_id))
}

// ============================================================================
// Graph Models
// ============================================================================

/// A node of the raw graph dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Backend identifier (numbers are normalized to strings)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Free-text display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Node labels (e.g. "Person", "Organization")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Arbitrary node properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

impl GraphNode {
    /// Create a node with an id and no name or labels
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            labels: None,
            props: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.get_or_insert_with(Vec::new).push(label.into());
        self
    }

    /// Build a node from an untyped value, tolerating missing or mistyped
    /// fields. Returns `None` when the value carries no usable id.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(value_to_id)?;

        let name = obj.get("name").and_then(Value::as_str).map(str::to_string);
        let labels = obj.get("labels").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });
        let props = obj.get("props").and_then(Value::as_object).cloned();

        Some(Self {
            id,
            name,
            labels,
            props,
        })
    }

    /// Display name, if the node has a non-blank one
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// An edge of the raw graph dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Backend identifier
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Source node id
    #[serde(deserialize_with = "deserialize_id")]
    pub source: String,

    /// Target node id
    #[serde(deserialize_with = "deserialize_id")]
    pub target: String,

    /// Relationship type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,

    /// Arbitrary edge properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Map<String, Value>>,
}

impl GraphEdge {
    /// Create an untyped edge between two node ids
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            edge_type: None,
            props: None,
        }
    }

    /// Set the relationship type
    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }

    /// Set the edge id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Build an edge from an untyped value. Returns `None` when either
    /// endpoint is missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: obj.get("id").and_then(value_to_id),
            source: obj.get("source").and_then(value_to_id)?,
            target: obj.get("target").and_then(value_to_id)?,
            edge_type: obj.get("type").and_then(Value::as_str).map(str::to_string),
            props: obj.get("props").and_then(Value::as_object).cloned(),
        })
    }
}

/// Deduplicated, capped graph ready for the layout renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGraph {
    /// Retained nodes, in first-seen order
    pub nodes: Vec<GraphNode>,

    /// Edges whose endpoints are both retained
    #[serde(alias = "edges")]
    pub links: Vec<GraphEdge>,
}

impl CanonicalGraph {
    /// True when there is nothing to render
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Inferred Entities
// ============================================================================

/// Subject / role / organization guessed from an agent answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredEntity {
    pub name: Option<String>,
    pub role: Option<String>,
    pub org: Option<String>,
}

impl InferredEntity {
    /// Entity with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            role: None,
            org: None,
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the organization
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// True when no rule produced a name
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_node_numeric_id() {
        let node: GraphNode =
            serde_json::from_value(json!({"id": 7, "name": "Acme", "labels": ["Organization"]}))
                .unwrap();
        assert_eq!(node.id, "7");
        assert_eq!(node.labels, Some(vec!["Organization".to_string()]));
    }

    #[test]
    fn test_node_from_value_tolerates_bad_fields() {
        let node = GraphNode::from_value(&json!({"id": "n1", "name": 5, "labels": ["A", 3]}))
            .unwrap();
        assert_eq!(node.name, None);
        assert_eq!(node.labels, Some(vec!["A".to_string()]));

        assert!(GraphNode::from_value(&json!({"name": "no id"})).is_none());
        assert!(GraphNode::from_value(&json!("not an object")).is_none());
    }

    #[test]
    fn test_edge_type_field() {
        let edge: GraphEdge = serde_json::from_value(
            json!({"id": 3, "source": "a", "target": 9, "type": "RELATED"}),
        )
        .unwrap();
        assert_eq!(edge.id.as_deref(), Some("3"));
        assert_eq!(edge.target, "9");
        assert_eq!(edge.edge_type.as_deref(), Some("RELATED"));

        let out = serde_json::to_value(&edge).unwrap();
        assert_eq!(out["type"], "RELATED");
        assert!(out.get("props").is_none());
    }

    #[test]
    fn test_canonical_graph_serializes_links() {
        let graph = CanonicalGraph {
            nodes: vec![GraphNode::new("1").with_name("Jane Doe")],
            links: vec![],
        };
        let out = serde_json::to_value(&graph).unwrap();
        assert!(out["links"].is_array());
        assert!(!graph.is_empty());
        assert!(CanonicalGraph::default().is_empty());
    }

    #[test]
    fn test_display_name_blank() {
        assert_eq!(GraphNode::new("1").with_name("   ").display_name(), None);
        assert_eq!(
            GraphNode::new("1").with_name(" Acme ").display_name(),
            Some("Acme")
        );
    }

    #[test]
    fn test_inferred_entity_builder() {
        let entity = InferredEntity::named("Jane Doe")
            .with_role("CFO")
            .with_org("Acme Corp");
        assert!(!entity.is_empty());
        assert_eq!(entity.org.as_deref(), Some("Acme Corp"));
        assert!(InferredEntity::default().is_empty());
    }
}
