//! Gotham Graph - Graph canonicalization
//!
//! Raw graph dumps from the backend contain the same concept several times
//! (one node per mention), edges to nodes that were never returned, and
//! more nodes than a preview can lay out. This crate reduces such a dump to
//! a graph the force-directed renderer can consume directly.

pub mod canonical;

pub use canonical::{
    canonical_key, canonicalize, CanonicalStats, GraphCanonicalizer, DEFAULT_MAX_NODES,
};
pub use gotham_core::{CanonicalGraph, GraphEdge, GraphNode};
