//! Typed decoding of tagged RDF terms.
//!
//! The query service returns every cell as a tagged descriptor: a `literal`
//! with an optional datatype IRI, or a `uri` pointing at a resource. Decoding
//! projects these onto native values ([`TypedValue`]) so the rest of the
//! engine never inspects wire fields.
//!
//! Two failure modes are deliberately distinct:
//!
//! - an unrecognized *datatype* on a literal degrades to the raw string and is
//!   reported through the injected [`DecodeObserver`] (non-fatal)
//! - an unrecognized *term kind* is a hard [`DecodeError`] carrying the full
//!   descriptor, and fails the containing row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DecodeError;

/// Datatype IRI for xsd:dateTime literals.
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Datatype IRI for xsd:decimal literals.
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

/// One cell of a query result as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDescriptor {
    /// Term kind: `"literal"` or `"uri"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw string form of the term.
    pub value: String,
    /// Datatype IRI for typed literals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Language tag for language-tagged literals. Retained for diagnostics.
    #[serde(default, rename = "xml:lang", skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl ValueDescriptor {
    /// Build a descriptor with an arbitrary kind.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    /// A plain (untyped) literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new("literal", value)
    }

    /// A literal with a datatype IRI.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let mut descriptor = Self::new("literal", value);
        descriptor.datatype = Some(datatype.into());
        descriptor
    }

    /// A resource term.
    pub fn uri(value: impl Into<String>) -> Self {
        Self::new("uri", value)
    }
}

/// A decoded RDF term.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Plain or language-tagged string. Also the degraded form of literals
    /// whose datatype the decoder does not project.
    Text(String),
    /// xsd:dateTime literal.
    Instant(DateTime<Utc>),
    /// xsd:decimal literal.
    Decimal(f64),
    /// A dereferenceable resource identifier.
    Resource(Url),
}

impl TypedValue {
    /// The text content, if this is a textual value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The parsed IRI, if this is a resource.
    pub fn as_resource(&self) -> Option<&Url> {
        match self {
            TypedValue::Resource(url) => Some(url),
            _ => None,
        }
    }

    /// Stable string form used as a graph identifier.
    ///
    /// Resources render as their full IRI, so the same entity reached from
    /// different rows always yields the same id.
    pub fn id_string(&self) -> String {
        match self {
            TypedValue::Resource(url) => url.as_str().to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Text(s) => write!(f, "{s}"),
            TypedValue::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            TypedValue::Decimal(n) => write!(f, "{n}"),
            TypedValue::Resource(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode observer
// ---------------------------------------------------------------------------

/// Observer for degraded (non-fatal) decode events.
///
/// Injected into the decoder so the core stays decoupled from any particular
/// diagnostic sink.
pub trait DecodeObserver: Send + Sync {
    /// A literal carried a datatype the decoder does not project; the raw
    /// string was passed through unchanged.
    fn unsupported_datatype(&self, datatype: &str, descriptor: &ValueDescriptor);
}

/// Default observer: one `tracing` warning per degraded decode.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn unsupported_datatype(&self, datatype: &str, descriptor: &ValueDescriptor) {
        tracing::warn!(
            datatype,
            raw = %descriptor.value,
            "unsupported literal datatype, keeping raw string"
        );
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a tagged descriptor into a native typed value.
///
/// Pure apart from observer notification on degraded paths.
pub fn decode(
    descriptor: &ValueDescriptor,
    observer: &dyn DecodeObserver,
) -> Result<TypedValue, DecodeError> {
    match descriptor.kind.as_str() {
        "literal" => match descriptor.datatype.as_deref() {
            None => Ok(TypedValue::Text(descriptor.value.clone())),
            Some(XSD_DATE_TIME) => {
                let instant = DateTime::parse_from_rfc3339(&descriptor.value).map_err(|e| {
                    DecodeError::InvalidDateTime {
                        raw: descriptor.value.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(TypedValue::Instant(instant.with_timezone(&Utc)))
            }
            Some(XSD_DECIMAL) => {
                let number =
                    descriptor
                        .value
                        .parse::<f64>()
                        .map_err(|_| DecodeError::InvalidDecimal {
                            raw: descriptor.value.clone(),
                        })?;
                Ok(TypedValue::Decimal(number))
            }
            Some(other) => {
                observer.unsupported_datatype(other, descriptor);
                Ok(TypedValue::Text(descriptor.value.clone()))
            }
        },
        "uri" => {
            let url = Url::parse(&descriptor.value).map_err(|e| DecodeError::InvalidIri {
                raw: descriptor.value.clone(),
                message: e.to_string(),
            })?;
            Ok(TypedValue::Resource(url))
        }
        _ => Err(DecodeError::UnsupportedKind {
            descriptor: descriptor.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts degraded decodes instead of logging them.
    #[derive(Default)]
    struct CountingObserver(AtomicUsize);

    impl DecodeObserver for CountingObserver {
        fn unsupported_datatype(&self, _datatype: &str, _descriptor: &ValueDescriptor) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn plain_literal_decodes_to_text() {
        let value = decode(&ValueDescriptor::literal("hello"), &TracingObserver).unwrap();
        assert_eq!(value, TypedValue::Text("hello".into()));
    }

    #[test]
    fn decimal_literal_decodes_to_number() {
        let descriptor = ValueDescriptor::typed_literal("3.14", XSD_DECIMAL);
        let value = decode(&descriptor, &TracingObserver).unwrap();
        assert_eq!(value, TypedValue::Decimal(3.14));
    }

    #[test]
    fn datetime_literal_decodes_to_instant() {
        let descriptor = ValueDescriptor::typed_literal("2020-01-01T00:00:00Z", XSD_DATE_TIME);
        let value = decode(&descriptor, &TracingObserver).unwrap();
        match value {
            TypedValue::Instant(t) => assert_eq!(t.to_rfc3339(), "2020-01-01T00:00:00+00:00"),
            other => panic!("expected Instant, got {other:?}"),
        }
    }

    #[test]
    fn malformed_datetime_is_fatal() {
        let descriptor = ValueDescriptor::typed_literal("not a date", XSD_DATE_TIME);
        let err = decode(&descriptor, &TracingObserver).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDateTime { .. }));
    }

    #[test]
    fn unknown_datatype_degrades_to_raw_string() {
        let observer = CountingObserver::default();
        let descriptor = ValueDescriptor::typed_literal(
            "Point(9.0 48.5)",
            "http://www.opengis.net/ont/geosparql#wktLiteral",
        );
        let value = decode(&descriptor, &observer).unwrap();
        assert_eq!(value, TypedValue::Text("Point(9.0 48.5)".into()));
        assert_eq!(observer.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn uri_decodes_to_resource() {
        let descriptor = ValueDescriptor::uri("https://www.wikidata.org/wiki/Q42");
        let value = decode(&descriptor, &TracingObserver).unwrap();
        let url = value.as_resource().unwrap();
        assert_eq!(url.host_str(), Some("www.wikidata.org"));
        assert_eq!(url.path(), "/wiki/Q42");
    }

    #[test]
    fn unknown_kind_is_fatal_and_keeps_descriptor() {
        let descriptor = ValueDescriptor::new("bnode", "b0");
        let err = decode(&descriptor, &TracingObserver).unwrap_err();
        match err {
            DecodeError::UnsupportedKind { descriptor: d } => assert_eq!(d.kind, "bnode"),
            other => panic!("expected UnsupportedKind, got {other:?}"),
        }
    }

    #[test]
    fn id_string_is_stable_for_resources() {
        let descriptor = ValueDescriptor::uri("http://www.wikidata.org/entity/Q42");
        let value = decode(&descriptor, &TracingObserver).unwrap();
        assert_eq!(value.id_string(), "http://www.wikidata.org/entity/Q42");
    }

    #[test]
    fn descriptor_deserializes_from_sparql_json() {
        let descriptor: ValueDescriptor = serde_json::from_str(
            r#"{"type": "literal", "value": "Douglas Adams", "xml:lang": "en"}"#,
        )
        .unwrap();
        assert_eq!(descriptor.kind, "literal");
        assert_eq!(descriptor.value, "Douglas Adams");
        assert_eq!(descriptor.lang.as_deref(), Some("en"));
        assert!(descriptor.datatype.is_none());
    }
}
