use crate::models::UNKNOWN_OPERATION_NAME;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

// ASCII whitespace and word characters only; the capture never includes
// `(` or `{`.
static OPERATION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(query|mutation)[ \t\n\x0B\x0C\r]+([A-Za-z0-9_]+)")
        .expect("operation name pattern")
});

/// Where a request's operation name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Explicit,
    Extracted,
    Unknown,
}

/// Identity of one request, computed once when the engine starts it and
/// shared read-only by every phase of that request.
#[derive(Debug, Clone)]
pub struct RequestState {
    raw_query: String,
    content_hash: String,
    operation_name: String,
    name_source: NameSource,
}

impl RequestState {
    pub fn new(raw_query: impl Into<String>, operation_name: Option<&str>) -> Self {
        let raw_query = raw_query.into();
        let content_hash = sha256_hex(&raw_query);
        let explicit = operation_name
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let (operation_name, name_source) = match explicit {
            Some(name) => (name, NameSource::Explicit),
            None => match extract_operation_name(&raw_query) {
                Some(name) => (name, NameSource::Extracted),
                None => (UNKNOWN_OPERATION_NAME.to_string(), NameSource::Unknown),
            },
        };
        debug!(
            target = "graphql_timer.state",
            operation_name = %operation_name,
            sha256 = %content_hash,
            source = ?name_source,
            "request_state_created"
        );
        Self {
            raw_query,
            content_hash,
            operation_name,
            name_source,
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn name_source(&self) -> NameSource {
        self.name_source
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `input`.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Best-effort operation name: the first word after a `query` or
/// `mutation` keyword. Purely textual, the query does not need to parse.
pub fn extract_operation_name(query: &str) -> Option<String> {
    let captures = OPERATION_NAME_RE.captures(query)?;
    let name = captures.get(2)?.as_str();
    let name = name.strip_suffix(')').unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
