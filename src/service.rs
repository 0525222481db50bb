//! Narrow interfaces to the semantic-web query service.
//!
//! The incorporation core receives already-parsed rows; this module is the
//! collaborator that produces them. It builds the fixed-shape statement query,
//! performs the HTTP round trip, and exposes entity autocomplete for the
//! host's search box. The display language is an explicit configuration value
//! threaded into every request, never read from ambient runtime state.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ServiceError;
use crate::results::{ResultRow, SelectResponse};

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Default SPARQL endpoint of the Wikidata query service.
pub const DEFAULT_QUERY_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Default MediaWiki API endpoint used for entity autocomplete.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";

/// Fixed number of autocomplete suggestions requested.
const SUGGEST_LIMIT: u32 = 5;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Display-language tag for labels and autocomplete, e.g. `en` or `de`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Wrap a bare language code. Region subtags are stripped (`en-GB` → `en`),
    /// matching what the label service expects.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let bare = tag.split('-').next().unwrap_or(&tag);
        Self(bare.to_string())
    }

    /// The language code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self("en".into())
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Parameters of one fixed-shape statement query.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Starting entity identifier, e.g. `Q42`.
    pub entity_id: String,
    /// Display language for the label service.
    pub language: LanguageTag,
}

impl QuerySpec {
    /// Create a spec for the given starting entity.
    pub fn new(entity_id: impl Into<String>, language: LanguageTag) -> Self {
        Self {
            entity_id: entity_id.into(),
            language,
        }
    }

    /// Render the SPARQL SELECT for this spec.
    ///
    /// The row shape is fixed (subject id/label, statement id, predicate-class
    /// id/label, target id/label, optional qualifier fields) and ordered by
    /// predicate-class, statement, and target so related rows group
    /// deterministically.
    pub fn sparql(&self) -> String {
        format!(
            r#"SELECT ?subject ?subjectLabel ?relation ?relationLabel ?property ?statement ?target ?targetLabel ?qualifier ?qualifierValue ?qualifierValueLabel {{
  VALUES (?subject) {{(wd:{entity})}}

  ?subject ?property ?statement .
  ?statement ?statementProperty ?target .

  ?relation wikibase:claim ?property .
  ?relation wikibase:statementProperty ?statementProperty .

  OPTIONAL {{
    ?statement ?qualifier ?qualifierValue .
    ?qualifierRelation wikibase:qualifier ?qualifier .
  }}

  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{language}". }}
}} ORDER BY ?relation ?statement ?target"#,
            entity = self.entity_id,
            language = self.language,
        )
    }
}

/// Build the GET URL for a SPARQL query with JSON results.
pub fn endpoint_url(endpoint: &str, sparql: &str) -> ServiceResult<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| ServiceError::Endpoint {
        url: endpoint.to_string(),
        message: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("query", sparql)
        .append_pair("format", "json");
    Ok(url)
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

/// One entity-autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Entity identifier, e.g. `Q42`.
    pub id: String,
    /// Display label in the requested language.
    #[serde(default)]
    pub label: String,
    /// Short description, when the knowledge base has one.
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<Suggestion>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the query and autocomplete services.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: ureq::Agent,
    query_endpoint: String,
    search_endpoint: String,
    language: LanguageTag,
}

impl SparqlClient {
    /// Client against the default Wikidata endpoints.
    pub fn new(language: LanguageTag) -> Self {
        Self::with_endpoints(DEFAULT_QUERY_ENDPOINT, DEFAULT_SEARCH_ENDPOINT, language)
    }

    /// Client against custom endpoints (e.g. a local test server).
    pub fn with_endpoints(
        query_endpoint: impl Into<String>,
        search_endpoint: impl Into<String>,
        language: LanguageTag,
    ) -> Self {
        Self {
            http: ureq::Agent::new(),
            query_endpoint: query_endpoint.into(),
            search_endpoint: search_endpoint.into(),
            language,
        }
    }

    /// Fetch the statement rows for one starting entity.
    pub fn select(&self, entity_id: &str) -> ServiceResult<Vec<ResultRow>> {
        let spec = QuerySpec::new(entity_id, self.language.clone());
        let url = endpoint_url(&self.query_endpoint, &spec.sparql())?;

        tracing::debug!(entity = entity_id, "querying statement rows");
        let response = self
            .http
            .get(url.as_str())
            .call()
            .map_err(|e| ServiceError::Transport {
                message: e.to_string(),
            })?;
        let body: SelectResponse =
            response.into_json().map_err(|e| ServiceError::Response {
                message: e.to_string(),
            })?;
        Ok(body.results.bindings)
    }

    /// Entity autocomplete: at most five suggestions in the configured language.
    pub fn suggest(&self, text: &str) -> ServiceResult<Vec<Suggestion>> {
        let mut url = Url::parse(&self.search_endpoint).map_err(|e| ServiceError::Endpoint {
            url: self.search_endpoint.clone(),
            message: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("action", "wbsearchentities")
            .append_pair("format", "json")
            .append_pair("origin", "*")
            .append_pair("limit", &SUGGEST_LIMIT.to_string())
            .append_pair("continue", "0")
            .append_pair("language", self.language.as_str())
            .append_pair("uselang", self.language.as_str())
            .append_pair("search", text)
            .append_pair("type", "item");

        let response = self
            .http
            .get(url.as_str())
            .call()
            .map_err(|e| ServiceError::Transport {
                message: e.to_string(),
            })?;
        let body: SearchResponse =
            response.into_json().map_err(|e| ServiceError::Response {
                message: e.to_string(),
            })?;
        Ok(body.search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tag_strips_region() {
        assert_eq!(LanguageTag::new("en-GB").as_str(), "en");
        assert_eq!(LanguageTag::new("de").as_str(), "de");
        assert_eq!(LanguageTag::default().as_str(), "en");
    }

    #[test]
    fn sparql_names_the_entity_language_and_ordering() {
        let sparql = QuerySpec::new("Q42", LanguageTag::new("de")).sparql();
        assert!(sparql.contains("(wd:Q42)"));
        assert!(sparql.contains(r#"wikibase:language "de""#));
        assert!(sparql.ends_with("ORDER BY ?relation ?statement ?target"));
        for var in [
            "?subject",
            "?subjectLabel",
            "?relation",
            "?relationLabel",
            "?property",
            "?statement",
            "?target",
            "?targetLabel",
            "?qualifier",
        ] {
            assert!(sparql.contains(var), "missing {var}");
        }
    }

    #[test]
    fn endpoint_url_carries_query_and_format() {
        let url = endpoint_url(DEFAULT_QUERY_ENDPOINT, "SELECT * { ?s ?p ?o }").unwrap();
        assert_eq!(url.host_str(), Some("query.wikidata.org"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("format".into(), "json".into())));
        assert!(pairs.iter().any(|(k, v)| k == "query" && v.contains("SELECT")));
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let err = endpoint_url("not a url", "SELECT").unwrap_err();
        assert!(matches!(err, ServiceError::Endpoint { .. }));
    }

    #[test]
    fn suggestions_deserialize_from_search_response() {
        let body = r#"{
            "search": [
                {"id": "Q42", "label": "Douglas Adams", "description": "English author"},
                {"id": "Q42395533", "label": "Douglas Adams"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.search.len(), 2);
        assert_eq!(response.search[0].description.as_deref(), Some("English author"));
        assert!(response.search[1].description.is_none());
    }
}
