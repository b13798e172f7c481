//! Graph canonicalization
//!
//! Nodes that denote the same concept (same label set, same name up to case
//! and surrounding whitespace) collapse onto the first one seen. Edges are
//! rewired onto the surviving nodes, self-loops produced by the merge are
//! dropped, and the node list is capped for the renderer.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use gotham_core::{CanonicalGraph, GraphConfig, GraphEdge, GraphNode};
use serde::Serialize;

/// Node cap used by the graph preview
pub const DEFAULT_MAX_NODES: usize = 60;

/// Label signature of nodes without labels
const NO_LABELS: &str = "None";

/// Identity key of a node: sorted labels joined with `|` (or `None`),
/// then the trimmed lowercased name.
///
/// Returns `None` for nodes without a usable name; those never reach the
/// canonical graph.
pub fn canonical_key(node: &GraphNode) -> Option<String> {
    let name = node.display_name()?;

    let mut labels: Vec<&str> = node.labels.iter().flatten().map(String::as_str).collect();
    labels.sort_unstable();
    let signature = labels.join("|");
    let signature = if signature.is_empty() {
        NO_LABELS
    } else {
        signature.as_str()
    };

    Some(format!("{}::{}", signature, name.to_lowercase()))
}

/// Counters describing what a canonicalization pass discarded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalStats {
    pub input_nodes: usize,
    pub input_edges: usize,
    /// Nodes dropped for lacking a name
    pub unnamed_nodes: usize,
    /// Nodes folded into an earlier node with the same key
    pub merged_nodes: usize,
    /// Nodes cut by the cap
    pub truncated_nodes: usize,
    /// Edges with an endpoint that does not resolve to a named node
    pub unresolved_edges: usize,
    /// Edges whose endpoints collapsed onto one node
    pub self_loops: usize,
    /// Edges touching a node cut by the cap
    pub orphaned_edges: usize,
}

/// Canonicalizer with a fixed node cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphCanonicalizer {
    max_nodes: usize,
}

impl Default for GraphCanonicalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NODES)
    }
}

impl GraphCanonicalizer {
    pub fn new(max_nodes: usize) -> Self {
        Self { max_nodes }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(config.max_nodes)
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Canonicalize a raw node and edge list
    pub fn canonicalize(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> CanonicalGraph {
        self.canonicalize_with_stats(nodes, edges).0
    }

    /// Canonicalize, also reporting what was discarded
    pub fn canonicalize_with_stats(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> (CanonicalGraph, CanonicalStats) {
        let mut stats = CanonicalStats {
            input_nodes: nodes.len(),
            input_edges: edges.len(),
            ..Default::default()
        };

        // First node per key wins, in input order
        let mut kept: Vec<&GraphNode> = Vec::new();
        let mut canonical_ids: HashMap<String, &str> = HashMap::new();
        for node in nodes {
            let Some(key) = canonical_key(node) else {
                stats.unnamed_nodes += 1;
                continue;
            };
            match canonical_ids.entry(key) {
                Entry::Occupied(_) => stats.merged_nodes += 1,
                Entry::Vacant(slot) => {
                    slot.insert(node.id.as_str());
                    kept.push(node);
                }
            }
        }

        // Duplicate ids resolve to the first node carrying them
        let mut by_id: HashMap<&str, &GraphNode> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.entry(node.id.as_str()).or_insert(node);
        }

        let resolve = |id: &str| -> Option<&str> {
            let node = by_id.get(id)?;
            let key = canonical_key(node)?;
            canonical_ids.get(&key).copied()
        };

        let mut links = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(source), Some(target)) = (resolve(&edge.source), resolve(&edge.target))
            else {
                stats.unresolved_edges += 1;
                continue;
            };
            if source == target {
                stats.self_loops += 1;
                continue;
            }
            links.push(GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                ..edge.clone()
            });
        }

        if kept.len() > self.max_nodes {
            stats.truncated_nodes = kept.len() - self.max_nodes;
            kept.truncate(self.max_nodes);
        }

        let retained: HashSet<&str> = kept.iter().map(|node| node.id.as_str()).collect();
        let before = links.len();
        links.retain(|edge| {
            retained.contains(edge.source.as_str()) && retained.contains(edge.target.as_str())
        });
        stats.orphaned_edges = before - links.len();

        let graph = CanonicalGraph {
            nodes: kept.into_iter().cloned().collect(),
            links,
        };

        tracing::debug!(
            "Canonicalized graph: {} -> {} nodes, {} -> {} links ({} merged, {} unnamed, {} truncated)",
            stats.input_nodes,
            graph.nodes.len(),
            stats.input_edges,
            graph.links.len(),
            stats.merged_nodes,
            stats.unnamed_nodes,
            stats.truncated_nodes
        );

        (graph, stats)
    }
}

/// Canonicalize with an explicit node cap
pub fn canonicalize(nodes: &[GraphNode], edges: &[GraphEdge], max_nodes: usize) -> CanonicalGraph {
    GraphCanonicalizer::new(max_nodes).canonicalize(nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, name: &str) -> GraphNode {
        GraphNode::new(id).with_name(name).with_label("Person")
    }

    #[test]
    fn test_canonical_key() {
        let node = GraphNode::new("1")
            .with_name("  Acme Corp ")
            .with_label("Organization")
            .with_label("Company");
        assert_eq!(
            canonical_key(&node).as_deref(),
            Some("Company|Organization::acme corp")
        );

        let bare = GraphNode::new("2").with_name("Acme");
        assert_eq!(canonical_key(&bare).as_deref(), Some("None::acme"));

        assert_eq!(canonical_key(&GraphNode::new("3")), None);
        assert_eq!(canonical_key(&GraphNode::new("4").with_name("   ")), None);
    }

    #[test]
    fn test_key_does_not_reorder_labels() {
        let node = GraphNode::new("1")
            .with_name("x")
            .with_label("b")
            .with_label("a");
        let _ = canonical_key(&node);
        assert_eq!(node.labels, Some(vec!["b".to_string(), "a".to_string()]));
    }

    #[test]
    fn test_case_duplicates_merge() {
        let nodes = vec![
            person("1", "Alice"),
            person("2", "alice "),
            person("3", "Bob"),
        ];
        let edges = vec![GraphEdge::new("2", "3").with_type("KNOWS")];

        let graph = canonicalize(&nodes, &edges, DEFAULT_MAX_NODES);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(graph.links, vec![GraphEdge::new("1", "3").with_type("KNOWS")]);
    }

    #[test]
    fn test_same_name_different_labels_stay_apart() {
        let nodes = vec![
            GraphNode::new("1").with_name("Delta").with_label("Organization"),
            GraphNode::new("2").with_name("Delta").with_label("Location"),
            GraphNode::new("3").with_name("Delta"),
        ];
        let graph = canonicalize(&nodes, &[], DEFAULT_MAX_NODES);
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn test_edges_to_unnamed_nodes_dropped() {
        let nodes = vec![person("1", "Alice"), GraphNode::new("2")];
        let edges = vec![GraphEdge::new("1", "2"), GraphEdge::new("1", "missing")];

        let (graph, stats) = GraphCanonicalizer::default().canonicalize_with_stats(&nodes, &edges);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.links.is_empty());
        assert_eq!(stats.unnamed_nodes, 1);
        assert_eq!(stats.unresolved_edges, 2);
    }

    #[test]
    fn test_cap_keeps_first_nodes_and_their_edges() {
        let nodes: Vec<GraphNode> = (0..100)
            .map(|i| person(&i.to_string(), &format!("Person {i}")))
            .collect();
        let edges: Vec<GraphEdge> = (0..99)
            .map(|i| GraphEdge::new(i.to_string(), (i + 1).to_string()))
            .collect();

        let (graph, stats) = GraphCanonicalizer::new(60).canonicalize_with_stats(&nodes, &edges);
        assert_eq!(graph.nodes.len(), 60);
        assert_eq!(graph.nodes[0].id, "0");
        assert_eq!(graph.nodes[59].id, "59");
        assert_eq!(graph.links.len(), 59);
        assert_eq!(stats.truncated_nodes, 40);
        assert_eq!(stats.orphaned_edges, 40);

        let retained: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert!(graph
            .links
            .iter()
            .all(|e| retained.contains(e.source.as_str()) && retained.contains(e.target.as_str())));
    }

    #[test]
    fn test_merged_self_loop_dropped() {
        let nodes = vec![person("1", "Alice"), person("2", "ALICE")];
        let edges = vec![GraphEdge::new("1", "2"), GraphEdge::new("1", "1")];

        let (graph, stats) = GraphCanonicalizer::default().canonicalize_with_stats(&nodes, &edges);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.links.is_empty());
        assert_eq!(stats.self_loops, 2);
    }

    #[test]
    fn test_parallel_edges_preserved() {
        let nodes = vec![person("1", "Alice"), person("2", "Bob"), person("3", "bob")];
        let edges = vec![
            GraphEdge::new("1", "2").with_id("e1"),
            GraphEdge::new("1", "3").with_id("e2"),
        ];

        let graph = canonicalize(&nodes, &edges, DEFAULT_MAX_NODES);
        assert_eq!(graph.links.len(), 2);
        assert!(graph.links.iter().all(|e| e.source == "1" && e.target == "2"));
        assert_eq!(graph.links[1].id.as_deref(), Some("e2"));
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_node() {
        let nodes = vec![
            person("1", "Alice"),
            person("2", "Bob"),
            person("2", "Carol"),
        ];
        let edges = vec![GraphEdge::new("1", "2")];

        let graph = canonicalize(&nodes, &edges, DEFAULT_MAX_NODES);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.links, vec![GraphEdge::new("1", "2")]);
    }

    #[test]
    fn test_canonical_input_unchanged() {
        let nodes = vec![person("1", "Alice"), person("2", "Bob")];
        let edges = vec![GraphEdge::new("1", "2").with_type("KNOWS")];

        let graph = canonicalize(&nodes, &edges, DEFAULT_MAX_NODES);
        assert_eq!(graph.nodes, nodes);
        assert_eq!(graph.links, edges);
        assert_eq!(canonicalize(&graph.nodes, &graph.links, DEFAULT_MAX_NODES), graph);
    }

    #[test]
    fn test_empty_input() {
        let graph = canonicalize(&[], &[], DEFAULT_MAX_NODES);
        assert!(graph.is_empty());
        assert!(graph.links.is_empty());

        let nothing = canonicalize(&[person("1", "Alice")], &[], 0);
        assert!(nothing.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = GraphConfig {
            max_nodes: 12,
            ..Default::default()
        };
        assert_eq!(GraphCanonicalizer::from_config(&config).max_nodes(), 12);
        assert_eq!(GraphCanonicalizer::default().max_nodes(), DEFAULT_MAX_NODES);
    }
}
