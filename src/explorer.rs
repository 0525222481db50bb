//! Explorer facade: top-level API for growing a graph from query results.
//!
//! An [`Explorer`] owns one [`GraphStore`] together with the mapper,
//! incorporator, and service client configured for one knowledge base. The
//! host application creates and owns the explorer; multiple independent
//! explorers (and therefore graphs) can coexist in one process.

use std::sync::Arc;

use crate::error::{ExplorerError, GraphError, LoomResult};
use crate::graph::store::GraphStore;
use crate::incorporate::{Incorporator, IncorporationReport, LayoutEngine, DEFAULT_NODE_SEPARATION};
use crate::mapper::RowMapper;
use crate::queue::IncorporationQueue;
use crate::results::ResultRow;
use crate::service::{
    LanguageTag, SparqlClient, Suggestion, DEFAULT_QUERY_ENDPOINT, DEFAULT_SEARCH_ENDPOINT,
};

/// Configuration for an [`Explorer`].
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Display-language tag for labels and autocomplete.
    pub language: LanguageTag,
    /// Host fragment identifying the knowledge base's own resources.
    pub knowledge_base_domain: String,
    /// Terminal path segment of the depicted-image predicate.
    pub media_property: String,
    /// Node separation handed to the layout engine after each batch.
    pub node_separation: u32,
    /// SPARQL query endpoint.
    pub query_endpoint: String,
    /// Entity-search endpoint for autocomplete.
    pub search_endpoint: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            language: LanguageTag::default(),
            knowledge_base_domain: "wikidata.org".into(),
            media_property: "P18".into(),
            node_separation: DEFAULT_NODE_SEPARATION,
            query_endpoint: DEFAULT_QUERY_ENDPOINT.into(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.into(),
        }
    }
}

/// Top-level handle over one exploration graph.
pub struct Explorer {
    config: ExplorerConfig,
    store: Arc<GraphStore>,
    incorporator: Incorporator,
    client: SparqlClient,
}

impl Explorer {
    /// Create an explorer with the given configuration and layout collaborator.
    pub fn new(config: ExplorerConfig, layout: Arc<dyn LayoutEngine>) -> LoomResult<Self> {
        if config.knowledge_base_domain.is_empty() {
            return Err(ExplorerError::InvalidConfig {
                message: "knowledge_base_domain must not be empty".into(),
            }
            .into());
        }
        if config.media_property.is_empty() {
            return Err(ExplorerError::InvalidConfig {
                message: "media_property must not be empty".into(),
            }
            .into());
        }
        if config.node_separation == 0 {
            return Err(ExplorerError::InvalidConfig {
                message: "node_separation must be > 0".into(),
            }
            .into());
        }

        tracing::info!(
            language = %config.language,
            domain = %config.knowledge_base_domain,
            "initializing explorer"
        );

        let mapper = RowMapper::new(&config.knowledge_base_domain, &config.media_property);
        let incorporator =
            Incorporator::new(mapper, layout).with_node_separation(config.node_separation);
        let client = SparqlClient::with_endpoints(
            &config.query_endpoint,
            &config.search_endpoint,
            config.language.clone(),
        );

        Ok(Self {
            config,
            store: Arc::new(GraphStore::new()),
            incorporator,
            client,
        })
    }

    /// Incorporate already-fetched rows into the graph.
    pub fn incorporate_rows(&self, rows: &[ResultRow]) -> LoomResult<IncorporationReport> {
        self.incorporator.incorporate(rows, &self.store)
    }

    /// Query the service for an entity's statements and incorporate them.
    pub fn expand(&self, entity_id: &str) -> LoomResult<IncorporationReport> {
        let rows = self.client.select(entity_id)?;
        self.incorporate_rows(&rows)
    }

    /// Expand from an existing node.
    ///
    /// The node must be an external reference; its trailing identifier
    /// segment seeds the new query. (A modifier-key click in the host UI
    /// opens the node's identifier as a link instead and never reaches this
    /// call.)
    pub fn expand_node(&self, node_id: &str) -> LoomResult<IncorporationReport> {
        let node = self
            .store
            .node(node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                id: node_id.to_string(),
            })?;
        let entity_id = node.entity_id().ok_or_else(|| GraphError::NotExpandable {
            id: node_id.to_string(),
        })?;
        self.expand(&entity_id)
    }

    /// Entity autocomplete in the configured language.
    pub fn suggest(&self, text: &str) -> LoomResult<Vec<Suggestion>> {
        Ok(self.client.suggest(text)?)
    }

    /// Spawn a serialized batch queue over this explorer's store.
    ///
    /// Overlapping user-triggered expansions submitted through the queue
    /// apply strictly in submission order.
    pub fn queue(&self) -> IncorporationQueue {
        IncorporationQueue::spawn(self.incorporator.clone(), Arc::clone(&self.store))
    }

    /// The shared graph store.
    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// The explorer configuration.
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Explorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeSpec, NodeTag};
    use crate::incorporate::NoLayout;
    use crate::results::var;
    use crate::value::ValueDescriptor;

    fn explorer() -> Explorer {
        Explorer::new(ExplorerConfig::default(), Arc::new(NoLayout)).unwrap()
    }

    #[test]
    fn empty_domain_is_rejected() {
        let config = ExplorerConfig {
            knowledge_base_domain: String::new(),
            ..Default::default()
        };
        assert!(Explorer::new(config, Arc::new(NoLayout)).is_err());
    }

    #[test]
    fn zero_node_separation_is_rejected() {
        let config = ExplorerConfig {
            node_separation: 0,
            ..Default::default()
        };
        assert!(Explorer::new(config, Arc::new(NoLayout)).is_err());
    }

    #[test]
    fn incorporate_rows_grows_the_store() {
        let explorer = explorer();
        let rows = vec![ResultRow::new()
            .with(var::SUBJECT, ValueDescriptor::uri("http://www.wikidata.org/entity/Q1"))
            .with(var::SUBJECT_LABEL, ValueDescriptor::literal("universe"))
            .with(
                var::STATEMENT,
                ValueDescriptor::uri("http://www.wikidata.org/entity/statement/s1"),
            )
            .with(var::PROPERTY, ValueDescriptor::uri("http://www.wikidata.org/prop/P31"))
            .with(var::RELATION_LABEL, ValueDescriptor::literal("instance of"))
            .with(var::TARGET, ValueDescriptor::uri("http://www.wikidata.org/entity/Q36906466"))
            .with(var::TARGET_LABEL, ValueDescriptor::literal("universe"))];

        let report = explorer.incorporate_rows(&rows).unwrap();
        assert_eq!(report.nodes_added, 2);
        assert_eq!(report.edges_added, 1);
        assert_eq!(explorer.store().node_count(), 2);
    }

    #[test]
    fn expand_node_rejects_unknown_ids() {
        let result = explorer().expand_node("http://www.wikidata.org/entity/Q404");
        assert!(matches!(
            result,
            Err(crate::error::LoomError::Graph(GraphError::NodeNotFound { .. }))
        ));
    }

    #[test]
    fn expand_node_rejects_plain_nodes() {
        let explorer = explorer();
        explorer.store().upsert_node(NodeSpec::new("42", "a literal"));
        let result = explorer.expand_node("42");
        assert!(matches!(
            result,
            Err(crate::error::LoomError::Graph(GraphError::NotExpandable { .. }))
        ));
    }

    #[test]
    fn external_reference_nodes_expose_an_entity_id() {
        let explorer = explorer();
        explorer.store().upsert_node(
            NodeSpec::new("https://www.wikidata.org/wiki/Q42", "Douglas Adams")
                .with_tag(NodeTag::ExternalReference),
        );
        let node = explorer.store().node("https://www.wikidata.org/wiki/Q42").unwrap();
        assert_eq!(node.entity_id().as_deref(), Some("Q42"));
    }
}
