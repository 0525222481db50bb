//! Append-only deduplicated graph store.
//!
//! Uses `petgraph` for the graph structure and `DashMap` for O(1) id lookups.
//! Upserts are total functions: inserting an id that already exists is a
//! structural no-op (first-write-wins), which makes replayed and overlapping
//! result batches safe to apply in any interleaving.

use std::sync::RwLock;

use dashmap::DashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use super::{Edge, EdgeSpec, Node, NodeSpec};

/// Renderer-facing snapshot of the whole graph.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphElements {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Deduplicated node/edge store for one exploration session.
///
/// Entities are created only through upsert instructions and live for the
/// lifetime of the store; there is no update or delete path.
pub struct GraphStore {
    /// The directed graph: node weights are [`Node`], edge weights [`Edge`].
    graph: RwLock<DiGraph<Node, Edge>>,
    /// Node id → NodeIndex.
    node_index: DashMap<String, NodeIndex>,
    /// Edge (statement) id → EdgeIndex.
    edge_index: DashMap<String, EdgeIndex>,
}

impl GraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(DiGraph::new()),
            node_index: DashMap::new(),
            edge_index: DashMap::new(),
        }
    }

    /// Whether a node with this id has been inserted.
    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Whether an edge with this statement id has been inserted.
    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    /// Insert a node unless its id already exists.
    ///
    /// Returns `true` when the node was inserted, `false` when the id was
    /// already present (the existing node keeps its label and tags).
    pub fn upsert_node(&self, spec: NodeSpec) -> bool {
        if self.node_index.contains_key(&spec.id) {
            return false;
        }
        let mut graph = self.graph.write().expect("graph lock poisoned");
        // Double-check after acquiring the write lock.
        if self.node_index.contains_key(&spec.id) {
            return false;
        }
        let id = spec.id.clone();
        let idx = graph.add_node(Node::from(spec));
        self.node_index.insert(id, idx);
        true
    }

    /// Insert an edge unless its statement id already exists.
    ///
    /// Both endpoints must already be in the store; the caller guarantees the
    /// ordering. An edge whose endpoint is missing is dropped with a warning
    /// rather than panicking, keeping upsert a total function.
    pub fn upsert_edge(&self, spec: EdgeSpec) -> bool {
        if self.edge_index.contains_key(&spec.id) {
            return false;
        }
        let (source_idx, target_idx) = match (
            self.node_index.get(&spec.source),
            self.node_index.get(&spec.target),
        ) {
            (Some(s), Some(t)) => (*s.value(), *t.value()),
            _ => {
                tracing::warn!(
                    edge = %spec.id,
                    source = %spec.source,
                    target = %spec.target,
                    "dropping edge with missing endpoint"
                );
                return false;
            }
        };
        let mut graph = self.graph.write().expect("graph lock poisoned");
        if self.edge_index.contains_key(&spec.id) {
            return false;
        }
        let id = spec.id.clone();
        let idx = graph.add_edge(source_idx, target_idx, Edge::from(spec));
        self.edge_index.insert(id, idx);
        true
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<Node> {
        let idx = *self.node_index.get(id)?.value();
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.node_weight(idx).cloned()
    }

    /// Look up an edge by statement id.
    pub fn edge(&self, id: &str) -> Option<Edge> {
        let idx = *self.edge_index.get(id)?.value();
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.edge_weight(idx).cloned()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> Vec<Node> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.node_weights().cloned().collect()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> Vec<Edge> {
        let graph = self.graph.read().expect("graph lock poisoned");
        graph.edge_weights().cloned().collect()
    }

    /// Snapshot of the graph in the renderer element schema.
    pub fn elements(&self) -> GraphElements {
        GraphElements {
            nodes: self.nodes(),
            edges: self.edges(),
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}
