//! Result rows returned by the query service.
//!
//! A row maps variable names to tagged value descriptors; [`DecodedRow`] is
//! the same row after every cell has been decoded, with typed accessors for
//! the fixed variables of the statement query. Variables beyond the fixed set
//! are retained but not interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::value::{self, DecodeObserver, TypedValue, ValueDescriptor};

/// Fixed variable names of the statement query.
pub mod var {
    /// Subject entity identifier.
    pub const SUBJECT: &str = "subject";
    /// Subject display label.
    pub const SUBJECT_LABEL: &str = "subjectLabel";
    /// Statement (fact) identifier; becomes the edge id.
    pub const STATEMENT: &str = "statement";
    /// Raw predicate resource, used for classification only.
    pub const PROPERTY: &str = "property";
    /// Predicate-class identifier.
    pub const RELATION: &str = "relation";
    /// Predicate-class display label; becomes the edge label.
    pub const RELATION_LABEL: &str = "relationLabel";
    /// Statement-target identifier.
    pub const TARGET: &str = "target";
    /// Statement-target display label.
    pub const TARGET_LABEL: &str = "targetLabel";
    /// Qualifier predicate (optional).
    pub const QUALIFIER: &str = "qualifier";
    /// Qualifier value (optional).
    pub const QUALIFIER_VALUE: &str = "qualifierValue";
    /// Qualifier value display label (optional).
    pub const QUALIFIER_VALUE_LABEL: &str = "qualifierValueLabel";
}

/// One raw result row: variable name → tagged descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    bindings: BTreeMap<String, ValueDescriptor>,
}

impl ResultRow {
    /// An empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable. Later binds of the same variable replace earlier ones.
    pub fn with(mut self, name: impl Into<String>, descriptor: ValueDescriptor) -> Self {
        self.bindings.insert(name.into(), descriptor);
        self
    }

    /// Raw descriptor for a variable, if bound.
    pub fn get(&self, name: &str) -> Option<&ValueDescriptor> {
        self.bindings.get(name)
    }

    /// All bindings in variable-name order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &ValueDescriptor)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Wire shape of a SPARQL JSON `SELECT` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectResponse {
    pub results: SelectBindings,
}

/// The `results` object of a SPARQL JSON response.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectBindings {
    #[serde(default)]
    pub bindings: Vec<ResultRow>,
}

// ---------------------------------------------------------------------------
// Decoded rows
// ---------------------------------------------------------------------------

/// A result row after every cell has been decoded.
///
/// Identifier accessors (`subject`, `statement`, `property`, `target`) are
/// required and fail with [`DecodeError::MissingVariable`] when unbound.
/// Label accessors render to display text, empty when unbound; an empty
/// label is legal and produces a node with an empty short label.
#[derive(Debug, Clone)]
pub struct DecodedRow {
    values: BTreeMap<String, TypedValue>,
}

impl DecodedRow {
    /// Decode every cell of `row`.
    ///
    /// The first hard decode failure fails the whole row; degraded literal
    /// datatypes pass through as text and are reported to `observer`.
    pub fn decode(row: &ResultRow, observer: &dyn DecodeObserver) -> Result<Self, DecodeError> {
        let mut values = BTreeMap::new();
        for (name, descriptor) in row.bindings() {
            values.insert(name.to_string(), value::decode(descriptor, observer)?);
        }
        Ok(Self { values })
    }

    /// Decoded value for a variable, if bound.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    fn require(&self, name: &str) -> Result<&TypedValue, DecodeError> {
        self.values.get(name).ok_or_else(|| DecodeError::MissingVariable {
            name: name.to_string(),
        })
    }

    fn label_text(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(TypedValue::to_string)
            .unwrap_or_default()
    }

    /// Subject entity identifier.
    pub fn subject(&self) -> Result<&TypedValue, DecodeError> {
        self.require(var::SUBJECT)
    }

    /// Subject display label.
    pub fn subject_label(&self) -> String {
        self.label_text(var::SUBJECT_LABEL)
    }

    /// Statement (fact) identifier.
    pub fn statement(&self) -> Result<&TypedValue, DecodeError> {
        self.require(var::STATEMENT)
    }

    /// Raw predicate resource.
    pub fn property(&self) -> Result<&TypedValue, DecodeError> {
        self.require(var::PROPERTY)
    }

    /// Predicate-class display label.
    pub fn relation_label(&self) -> String {
        self.label_text(var::RELATION_LABEL)
    }

    /// Statement-target identifier.
    pub fn target(&self) -> Result<&TypedValue, DecodeError> {
        self.require(var::TARGET)
    }

    /// Statement-target display label.
    pub fn target_label(&self) -> String {
        self.label_text(var::TARGET_LABEL)
    }

    /// Qualifier predicate, when the statement carries one.
    ///
    /// Qualifiers are decoded but not materialized as edges; they are exposed
    /// here for hosts that want to inspect them.
    pub fn qualifier(&self) -> Option<&TypedValue> {
        self.values.get(var::QUALIFIER)
    }

    /// Qualifier value, when the statement carries one.
    pub fn qualifier_value(&self) -> Option<&TypedValue> {
        self.values.get(var::QUALIFIER_VALUE)
    }
}
