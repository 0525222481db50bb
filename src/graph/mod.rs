//! Property-graph data model for visual exploration.
//!
//! Nodes and edges carry a full `label` plus a renderer-friendly
//! `short_label`, and serialize in the camelCase element schema the rendering
//! collaborator consumes. The deduplicated store lives in [`store`].

pub mod store;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum rendered label length before shortening kicks in.
const MAX_LABEL_CHARS: usize = 50;

/// Shorten a label for rendering.
///
/// Labels of at most 50 characters pass through unchanged; longer ones keep
/// the first 44 and last 5 characters around a single ellipsis, for exactly
/// 50 characters total. Counted in `char`s, not bytes.
pub fn shorten_label(label: &str) -> String {
    let count = label.chars().count();
    if count <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let head: String = label.chars().take(MAX_LABEL_CHARS - 6).collect();
    let tail: String = label.chars().skip(count - 5).collect();
    format!("{head}…{tail}")
}

/// Classification tags attached to nodes for the renderer and the host UI.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum NodeTag {
    /// The identifier resolves inside the knowledge base itself; the node is
    /// eligible to seed a further query.
    ExternalReference,
    /// The node was reached through the depicted-image predicate.
    Media,
}

/// A node in the exploration graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable identifier, unique within a store.
    pub id: String,
    /// Full display label.
    pub label: String,
    /// Shortened label, a pure function of `label`.
    pub short_label: String,
    /// Classification tags.
    pub tags: BTreeSet<NodeTag>,
}

impl Node {
    /// Trailing path segment of an expandable node's identifier, used to seed
    /// a new query.
    ///
    /// `None` for nodes that are not external references or whose id is not a
    /// parseable IRI.
    pub fn entity_id(&self) -> Option<String> {
        if !self.tags.contains(&NodeTag::ExternalReference) {
            return None;
        }
        let url = Url::parse(&self.id).ok()?;
        url.path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .map(str::to_string)
    }
}

/// A directed edge in the exploration graph, identified by the statement that
/// asserted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Statement (fact) identifier, unique within a store.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Predicate-class display label.
    pub label: String,
    /// Shortened label, a pure function of `label`.
    pub short_label: String,
}

// ---------------------------------------------------------------------------
// Upsert instructions
// ---------------------------------------------------------------------------

/// Instruction to insert a node unless its id is already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    pub short_label: String,
    pub tags: BTreeSet<NodeTag>,
}

impl NodeSpec {
    /// Build a spec, deriving the shortened label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            short_label: shorten_label(&label),
            label,
            tags: BTreeSet::new(),
        }
    }

    /// Attach a classification tag.
    pub fn with_tag(mut self, tag: NodeTag) -> Self {
        self.tags.insert(tag);
        self
    }
}

impl From<NodeSpec> for Node {
    fn from(spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            label: spec.label,
            short_label: spec.short_label,
            tags: spec.tags,
        }
    }
}

/// Instruction to insert an edge unless its statement id is already present.
///
/// Both endpoints must be upserted ahead of (or alongside) the edge; the
/// mapper always emits node specs before the edge spec of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub short_label: String,
}

impl EdgeSpec {
    /// Build a spec, deriving the shortened label.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            short_label: shorten_label(&label),
            label,
        }
    }
}

impl From<EdgeSpec> for Edge {
    fn from(spec: EdgeSpec) -> Self {
        Self {
            id: spec.id,
            source: spec.source,
            target: spec.target,
            label: spec.label,
            short_label: spec.short_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_pass_through() {
        assert_eq!(shorten_label(""), "");
        assert_eq!(shorten_label("Douglas Adams"), "Douglas Adams");
        let exactly_50 = "a".repeat(50);
        assert_eq!(shorten_label(&exactly_50), exactly_50);
    }

    #[test]
    fn long_labels_shorten_to_fifty_chars() {
        let label = "The Hitchhiker's Guide to the Galaxy: A Trilogy in Five Parts";
        let short = shorten_label(label);
        assert_eq!(short.chars().count(), 50);
        let head: String = label.chars().take(44).collect();
        let tail: String = label.chars().skip(label.chars().count() - 5).collect();
        assert!(short.starts_with(&head));
        assert!(short.ends_with(&tail));
        assert_eq!(short.chars().nth(44), Some('…'));
    }

    #[test]
    fn shortening_counts_chars_not_bytes() {
        let label = "é".repeat(60);
        let short = shorten_label(&label);
        assert_eq!(short.chars().count(), 50);
    }

    #[test]
    fn node_spec_derives_short_label() {
        let spec = NodeSpec::new("id", "x".repeat(80));
        assert_eq!(spec.short_label.chars().count(), 50);
        let node = Node::from(spec);
        assert_eq!(node.label.chars().count(), 80);
    }

    #[test]
    fn entity_id_extracts_trailing_segment() {
        let node = Node {
            id: "https://www.wikidata.org/wiki/Q42".into(),
            label: "Douglas Adams".into(),
            short_label: "Douglas Adams".into(),
            tags: BTreeSet::from([NodeTag::ExternalReference]),
        };
        assert_eq!(node.entity_id().as_deref(), Some("Q42"));
    }

    #[test]
    fn entity_id_requires_external_reference() {
        let node = Node {
            id: "https://www.wikidata.org/wiki/Q42".into(),
            label: String::new(),
            short_label: String::new(),
            tags: BTreeSet::new(),
        };
        assert!(node.entity_id().is_none());
    }

    #[test]
    fn entity_id_none_for_literal_ids() {
        let node = Node {
            id: "42".into(),
            label: String::new(),
            short_label: String::new(),
            tags: BTreeSet::from([NodeTag::ExternalReference]),
        };
        assert!(node.entity_id().is_none());
    }

    #[test]
    fn node_serializes_in_renderer_schema() {
        let node = Node::from(
            NodeSpec::new("https://www.wikidata.org/wiki/Q42", "Douglas Adams")
                .with_tag(NodeTag::ExternalReference),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["shortLabel"], "Douglas Adams");
        assert_eq!(json["tags"][0], "external-reference");
    }
}
