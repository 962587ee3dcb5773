use std::fmt;
use std::hash::{Hash, Hasher};

pub const QUERY_TIMER_NAME: &str = "graphql.timer.query";
pub const RESOLVER_TIMER_NAME: &str = "graphql.timer.resolver";
pub const TIMER_DESCRIPTION: &str =
    "Timer that records the time to fetch the data by Operation Name";
pub const UNKNOWN_OPERATION_NAME: &str = "__UNKNOWN__";

pub const OPERATION_NAME_TAG: &str = "operationName";
pub const QUERY_HASH_TAG: &str = "sha256";
pub const OPERATION_TAG: &str = "operation";
pub const PARENT_TAG: &str = "parent";
pub const FIELD_TAG: &str = "field";

/// One stage of processing a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Validation,
    Parse,
    Execution,
    Resolvers,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Validation => "validation",
            Phase::Parse => "parse",
            Phase::Execution => "execution",
            Phase::Resolvers => "resolvers",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Phase::Resolvers => MetricKind::Resolver,
            _ => MetricKind::Query,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two timer series a measurement can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Query,
    Resolver,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub key: &'static str,
    pub value: String,
}

impl Tag {
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Registration key handed to a metrics backend.
///
/// Identity is the metric name plus the ordered tag list. The description
/// is carried along for backends that publish it but does not distinguish
/// two timers.
#[derive(Debug, Clone)]
pub struct TimerId {
    pub name: String,
    pub description: String,
    pub tags: Vec<Tag>,
}

impl TimerId {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn has_tags(&self, expected: &[(&str, &str)]) -> bool {
        expected
            .iter()
            .all(|(key, value)| self.tag(key) == Some(*value))
    }
}

impl PartialEq for TimerId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for TimerId {}

impl Hash for TimerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}
