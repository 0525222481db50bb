//! Mapping of decoded result rows into graph upsert instructions.
//!
//! One row describes one asserted statement: subject → target, labeled by the
//! statement's predicate class. The mapper emits idempotent upsert
//! instructions (the store decides whether insertion actually happens) and
//! always emits the endpoint node specs ahead of the edge spec.

use url::Url;

use crate::error::DecodeError;
use crate::graph::{EdgeSpec, NodeSpec, NodeTag};
use crate::results::DecodedRow;
use crate::value::TypedValue;

/// Upsert instructions produced from one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowElements {
    /// Node specs for the row's subject and target, in that order.
    pub nodes: Vec<NodeSpec>,
    /// Edge spec keyed by the row's statement identifier.
    pub edge: Option<EdgeSpec>,
}

/// Maps decoded rows into graph entities with stable identity.
#[derive(Debug, Clone)]
pub struct RowMapper {
    /// Host fragment identifying the knowledge base's own resources.
    knowledge_base_domain: String,
    /// Terminal path segment of the depicted-image predicate.
    media_property: String,
}

impl RowMapper {
    /// Create a mapper for the given knowledge-base domain and depicted-image
    /// property segment.
    pub fn new(
        knowledge_base_domain: impl Into<String>,
        media_property: impl Into<String>,
    ) -> Self {
        Self {
            knowledge_base_domain: knowledge_base_domain.into(),
            media_property: media_property.into(),
        }
    }

    /// Whether the value is a resource hosted by the knowledge base itself.
    ///
    /// This classification, not the raw identifier shape, controls whether a
    /// node is later eligible to seed further incorporation.
    fn is_knowledge_base_resource(&self, value: &TypedValue) -> bool {
        value
            .as_resource()
            .and_then(Url::host_str)
            .is_some_and(|host| host.contains(&self.knowledge_base_domain))
    }

    /// Whether the raw predicate is the depicted-image property.
    fn is_media_predicate(&self, predicate: &TypedValue) -> bool {
        predicate
            .as_resource()
            .is_some_and(|url| url.path().ends_with(&self.media_property))
    }

    /// Map one decoded row into upsert instructions.
    ///
    /// Qualifier cells are decoded with the rest of the row but not
    /// materialized as additional edges; they are discarded here.
    pub fn map_row(&self, row: &DecodedRow) -> Result<RowElements, DecodeError> {
        let subject = row.subject()?;
        let statement = row.statement()?;
        let property = row.property()?;
        let target = row.target()?;

        let subject_id = subject.id_string();
        let target_id = target.id_string();

        let mut subject_spec = NodeSpec::new(subject_id.clone(), row.subject_label());
        if self.is_knowledge_base_resource(subject) {
            subject_spec = subject_spec.with_tag(NodeTag::ExternalReference);
        }

        let mut target_spec = NodeSpec::new(target_id.clone(), row.target_label());
        if self.is_knowledge_base_resource(target) {
            target_spec = target_spec.with_tag(NodeTag::ExternalReference);
        }
        if self.is_media_predicate(property) {
            target_spec = target_spec.with_tag(NodeTag::Media);
        }

        let edge = EdgeSpec::new(
            statement.id_string(),
            subject_id,
            target_id,
            row.relation_label(),
        );

        Ok(RowElements {
            nodes: vec![subject_spec, target_spec],
            edge: Some(edge),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{var, ResultRow};
    use crate::value::{TracingObserver, ValueDescriptor};

    fn mapper() -> RowMapper {
        RowMapper::new("wikidata.org", "P18")
    }

    fn decode(row: &ResultRow) -> DecodedRow {
        DecodedRow::decode(row, &TracingObserver).unwrap()
    }

    fn statement_row(property: &str, target: ValueDescriptor, target_label: &str) -> ResultRow {
        ResultRow::new()
            .with(
                var::SUBJECT,
                ValueDescriptor::uri("http://www.wikidata.org/entity/Q42"),
            )
            .with(var::SUBJECT_LABEL, ValueDescriptor::literal("Douglas Adams"))
            .with(
                var::STATEMENT,
                ValueDescriptor::uri("http://www.wikidata.org/entity/statement/Q42-abc"),
            )
            .with(var::PROPERTY, ValueDescriptor::uri(property))
            .with(var::RELATION_LABEL, ValueDescriptor::literal("relation"))
            .with(var::TARGET, target)
            .with(var::TARGET_LABEL, ValueDescriptor::literal(target_label))
    }

    #[test]
    fn nodes_precede_edge_and_ids_line_up() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P69",
            ValueDescriptor::uri("http://www.wikidata.org/entity/Q691283"),
            "St John's College",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();

        assert_eq!(elements.nodes.len(), 2);
        let edge = elements.edge.unwrap();
        assert_eq!(edge.id, "http://www.wikidata.org/entity/statement/Q42-abc");
        assert_eq!(edge.source, elements.nodes[0].id);
        assert_eq!(edge.target, elements.nodes[1].id);
        assert_eq!(edge.label, "relation");
    }

    #[test]
    fn knowledge_base_resources_are_external_references() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P69",
            ValueDescriptor::uri("http://www.wikidata.org/entity/Q691283"),
            "St John's College",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();
        assert!(elements.nodes[0].tags.contains(&NodeTag::ExternalReference));
        assert!(elements.nodes[1].tags.contains(&NodeTag::ExternalReference));
    }

    #[test]
    fn foreign_resources_are_not_external_references() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P856",
            ValueDescriptor::uri("https://douglasadams.com/"),
            "official website",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();
        assert!(!elements.nodes[1].tags.contains(&NodeTag::ExternalReference));
    }

    #[test]
    fn literal_targets_are_plain_nodes() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P1082",
            ValueDescriptor::typed_literal("42", crate::value::XSD_DECIMAL),
            "42",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();
        assert_eq!(elements.nodes[1].id, "42");
        assert!(elements.nodes[1].tags.is_empty());
    }

    #[test]
    fn depicted_image_targets_are_media() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P18",
            ValueDescriptor::uri("http://commons.wikimedia.org/wiki/File:Adams.jpg"),
            "Adams.jpg",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();
        let target = &elements.nodes[1];
        assert!(target.tags.contains(&NodeTag::Media));
        // Commons is not the knowledge base itself.
        assert!(!target.tags.contains(&NodeTag::ExternalReference));
    }

    #[test]
    fn other_properties_are_not_media() {
        let row = statement_row(
            "http://www.wikidata.org/prop/P218",
            ValueDescriptor::uri("http://www.wikidata.org/entity/Q5"),
            "target",
        );
        let elements = mapper().map_row(&decode(&row)).unwrap();
        assert!(!elements.nodes[1].tags.contains(&NodeTag::Media));
    }

    #[test]
    fn empty_labels_produce_empty_short_labels() {
        let row = ResultRow::new()
            .with(var::SUBJECT, ValueDescriptor::uri("http://www.wikidata.org/entity/Q42"))
            .with(
                var::STATEMENT,
                ValueDescriptor::uri("http://www.wikidata.org/entity/statement/Q42-x"),
            )
            .with(var::PROPERTY, ValueDescriptor::uri("http://www.wikidata.org/prop/P1"))
            .with(var::TARGET, ValueDescriptor::uri("http://www.wikidata.org/entity/Q1"));
        let elements = mapper().map_row(&decode(&row)).unwrap();
        assert_eq!(elements.nodes[0].label, "");
        assert_eq!(elements.nodes[0].short_label, "");
    }

    #[test]
    fn duplicate_statement_rows_map_to_the_same_edge_id() {
        let first = statement_row(
            "http://www.wikidata.org/prop/P69",
            ValueDescriptor::uri("http://www.wikidata.org/entity/Q691283"),
            "St John's College",
        );
        // Same statement restated with a qualifier bound (join fan-out).
        let second = first.clone().with(
            var::QUALIFIER,
            ValueDescriptor::uri("http://www.wikidata.org/prop/qualifier/P582"),
        );

        let m = mapper();
        let a = m.map_row(&decode(&first)).unwrap();
        let b = m.map_row(&decode(&second)).unwrap();
        assert_eq!(a.edge.unwrap().id, b.edge.unwrap().id);
    }

    #[test]
    fn missing_identifier_fails_the_row() {
        let row = ResultRow::new().with(var::SUBJECT_LABEL, ValueDescriptor::literal("x"));
        let err = mapper().map_row(&decode(&row)).unwrap_err();
        assert!(matches!(err, DecodeError::MissingVariable { .. }));
    }
}
