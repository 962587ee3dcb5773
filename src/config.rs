use crate::models::{QUERY_TIMER_NAME, RESOLVER_TIMER_NAME, TIMER_DESCRIPTION};
use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid observer config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ObserverConfig {
    pub query_timer_name: String,
    pub resolver_timer_name: String,
    pub description: String,
    /// Skip field fetches the engine classifies as trivial.
    pub skip_trivial_fields: bool,
    pub enabled: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            query_timer_name: QUERY_TIMER_NAME.to_string(),
            resolver_timer_name: RESOLVER_TIMER_NAME.to_string(),
            description: TIMER_DESCRIPTION.to_string(),
            skip_trivial_fields: true,
            enabled: true,
        }
    }
}

impl ObserverConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            query_timer_name: env_string("GRAPHQL_TIMER_QUERY_METRIC")
                .unwrap_or(defaults.query_timer_name),
            resolver_timer_name: env_string("GRAPHQL_TIMER_RESOLVER_METRIC")
                .unwrap_or(defaults.resolver_timer_name),
            description: env_string("GRAPHQL_TIMER_DESCRIPTION").unwrap_or(defaults.description),
            skip_trivial_fields: parse_env_bool("GRAPHQL_TIMER_SKIP_TRIVIAL")
                .unwrap_or(defaults.skip_trivial_fields),
            enabled: parse_env_bool("GRAPHQL_TIMER_ENABLED").unwrap_or(defaults.enabled),
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        Ok(config.normalized())
    }

    /// Replace blank names with the defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            query_timer_name: non_blank(self.query_timer_name).unwrap_or(defaults.query_timer_name),
            resolver_timer_name: non_blank(self.resolver_timer_name)
                .unwrap_or(defaults.resolver_timer_name),
            description: non_blank(self.description).unwrap_or(defaults.description),
            ..self
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().and_then(non_blank)
}

fn parse_env_bool(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
