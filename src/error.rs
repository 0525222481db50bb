//! Rich diagnostic error types for graphloom.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::value::ValueDescriptor;

/// Top-level error type for graphloom.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the host application.
#[derive(Debug, Error, Diagnostic)]
pub enum LoomError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Explorer(#[from] ExplorerError),
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Fatal failures while decoding a tagged RDF term or a result row.
///
/// A literal with an *unrecognized datatype* is deliberately not represented
/// here: it degrades to the raw string and is reported through the
/// [`DecodeObserver`](crate::value::DecodeObserver) instead.
#[derive(Debug, Error, Diagnostic)]
pub enum DecodeError {
    #[error("unsupported RDF term kind: {}", .descriptor.kind)]
    #[diagnostic(
        code(loom::decode::unsupported_kind),
        help(
            "Only `literal` and `uri` terms can be decoded. Blank nodes and \
             other term kinds cannot be placed in the graph; the offending \
             descriptor is attached for inspection."
        )
    )]
    UnsupportedKind {
        /// The full descriptor as it arrived on the wire.
        descriptor: ValueDescriptor,
    },

    #[error("invalid xsd:dateTime literal: {raw}")]
    #[diagnostic(
        code(loom::decode::invalid_datetime),
        help("The literal is tagged xsd:dateTime but does not parse as RFC 3339. {message}")
    )]
    InvalidDateTime { raw: String, message: String },

    #[error("invalid xsd:decimal literal: {raw}")]
    #[diagnostic(
        code(loom::decode::invalid_decimal),
        help("The literal is tagged xsd:decimal but does not parse as a number.")
    )]
    InvalidDecimal { raw: String },

    #[error("invalid resource IRI: {raw}")]
    #[diagnostic(
        code(loom::decode::invalid_iri),
        help("A `uri` term must carry a parseable absolute IRI. {message}")
    )]
    InvalidIri { raw: String, message: String },

    #[error("result row is missing required variable ?{name}")]
    #[diagnostic(
        code(loom::decode::missing_variable),
        help(
            "Every statement row must bind the fixed variables (subject, \
             statement, property, target, ...). Check that the query selects \
             the full fixed row shape."
        )
    )]
    MissingVariable { name: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

/// Errors raised when resolving nodes for expansion.
///
/// The store's upsert operations are total and never fail; these variants
/// cover lookups on behalf of the host (e.g. click-to-expand).
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("node not found: {id}")]
    #[diagnostic(
        code(loom::graph::node_not_found),
        help("No node with this id has been incorporated. Check the id against `GraphStore::nodes()`.")
    )]
    NodeNotFound { id: String },

    #[error("node is not expandable: {id}")]
    #[diagnostic(
        code(loom::graph::not_expandable),
        help(
            "Only external-reference nodes (identifiers that resolve inside \
             the knowledge base itself) can seed a further query. Literal-valued \
             nodes have nothing to expand."
        )
    )]
    NotExpandable { id: String },
}

// ---------------------------------------------------------------------------
// Service errors
// ---------------------------------------------------------------------------

/// Failures in the query-service collaborator (transport and response shape).
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("invalid service endpoint: {url}")]
    #[diagnostic(
        code(loom::service::endpoint),
        help("The configured endpoint must be an absolute URL. {message}")
    )]
    Endpoint { url: String, message: String },

    #[error("request to query service failed: {message}")]
    #[diagnostic(
        code(loom::service::transport),
        help("The query service could not be reached or returned an error status. Retry policy, if any, belongs to the caller.")
    )]
    Transport { message: String },

    #[error("unexpected response from query service: {message}")]
    #[diagnostic(
        code(loom::service::response),
        help("The response body did not match the expected SPARQL JSON shape.")
    )]
    Response { message: String },
}

// ---------------------------------------------------------------------------
// Layout errors
// ---------------------------------------------------------------------------

/// Failure reported by the external layout collaborator.
///
/// Layout runs after the store has been mutated; a failure leaves the graph
/// contents intact but the visual positions stale.
#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    #[error("layout computation failed: {message}")]
    #[diagnostic(
        code(loom::layout::failed),
        help(
            "The layout engine rejected the graph or failed internally. The \
             incorporated nodes and edges are unaffected; re-running layout is \
             safe."
        )
    )]
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// Explorer errors
// ---------------------------------------------------------------------------

/// Errors from the explorer facade.
#[derive(Debug, Error, Diagnostic)]
pub enum ExplorerError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(loom::explorer::invalid_config),
        help("Check the ExplorerConfig fields. {message}")
    )]
    InvalidConfig { message: String },
}

/// Convenience alias for functions returning graphloom results.
pub type LoomResult<T> = std::result::Result<T, LoomError>;
