use crate::config::ObserverConfig;
use crate::metrics::{MetricsBackend, MetricsError};
use crate::models::{
    FIELD_TAG, MetricKind, OPERATION_NAME_TAG, OPERATION_TAG, PARENT_TAG, Phase, QUERY_HASH_TAG,
    Tag, TimerId,
};
use crate::state::RequestState;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{trace, warn};

/// What the engine knows about one field resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFetch {
    parent_type: String,
    field_name: String,
    trivial: bool,
}

impl FieldFetch {
    /// `parent_type` may be given in wrapped form (`[Foo!]!`); only the
    /// named type is kept. `field_name` is the declared name, not an alias.
    pub fn new(parent_type: &str, field_name: impl Into<String>, trivial: bool) -> Self {
        Self {
            parent_type: simple_type_name(parent_type).to_string(),
            field_name: field_name.into(),
            trivial,
        }
    }

    pub fn parent_type(&self) -> &str {
        &self.parent_type
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// True when the value is read straight off the parent object.
    pub fn is_trivial(&self) -> bool {
        self.trivial
    }
}

/// Strips list and non-null wrappers from a printed type reference.
pub fn simple_type_name(type_ref: &str) -> &str {
    type_ref
        .trim()
        .trim_start_matches('[')
        .trim_end_matches([']', '!'])
        .trim()
}

/// Explicit token for one running phase: the start instant plus the
/// fully tagged timer it will be recorded under.
#[must_use = "a phase timer records nothing until finished"]
pub struct PhaseTimer {
    active: Option<ActiveTimer>,
}

struct ActiveTimer {
    started: Instant,
    id: TimerId,
    backend: Arc<dyn MetricsBackend>,
}

impl PhaseTimer {
    pub fn noop() -> Self {
        Self { active: None }
    }

    pub fn is_noop(&self) -> bool {
        self.active.is_none()
    }

    pub fn timer_id(&self) -> Option<&TimerId> {
        self.active.as_ref().map(|active| &active.id)
    }

    /// Stops the timer and records it. Backend failures come back
    /// unchanged; no-op timers yield `Ok(None)`.
    pub fn finish(self) -> Result<Option<Duration>, MetricsError> {
        let Some(active) = self.active else {
            return Ok(None);
        };
        let elapsed = active.started.elapsed();
        let handle = active.backend.register_timer(&active.id)?;
        handle.record(elapsed);
        Ok(Some(elapsed))
    }
}

impl std::fmt::Debug for PhaseTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.active {
            Some(active) => f
                .debug_struct("PhaseTimer")
                .field("started", &active.started)
                .field("id", &active.id)
                .finish(),
            None => f.write_str("PhaseTimer(noop)"),
        }
    }
}

/// Bridges engine lifecycle events to timer registrations.
///
/// Holds no per-request state; clones share the backend and config.
#[derive(Clone)]
pub struct PhaseObserver {
    backend: Arc<dyn MetricsBackend>,
    config: Arc<ObserverConfig>,
}

impl PhaseObserver {
    pub fn new(backend: impl MetricsBackend + 'static) -> Self {
        Self::with_config(backend, ObserverConfig::default())
    }

    pub fn with_config(backend: impl MetricsBackend + 'static, config: ObserverConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            config: Arc::new(config.normalized()),
        }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Called once when the engine starts a request.
    pub fn create_state(
        &self,
        query: impl Into<String>,
        operation_name: Option<&str>,
    ) -> RequestState {
        RequestState::new(query, operation_name)
    }

    pub fn begin_validation(&self, state: &RequestState) -> PhaseTimer {
        self.begin_query_phase(state, Phase::Validation)
    }

    pub fn begin_parse(&self, state: &RequestState) -> PhaseTimer {
        self.begin_query_phase(state, Phase::Parse)
    }

    pub fn begin_execution(&self, state: &RequestState) -> PhaseTimer {
        self.begin_query_phase(state, Phase::Execution)
    }

    pub fn begin_field_fetch(&self, state: &RequestState, fetch: &FieldFetch) -> PhaseTimer {
        if !self.config.enabled {
            return PhaseTimer::noop();
        }
        if fetch.is_trivial() && self.config.skip_trivial_fields {
            trace!(
                target = "graphql_timer.observer",
                parent = %fetch.parent_type(),
                field = %fetch.field_name(),
                "trivial_field_skipped"
            );
            return PhaseTimer::noop();
        }
        let mut tags = identity_tags(state);
        tags.push(Tag::new(PARENT_TAG, fetch.parent_type()));
        tags.push(Tag::new(FIELD_TAG, fetch.field_name()));
        tags.push(Tag::new(OPERATION_TAG, Phase::Resolvers.as_str()));
        self.start(MetricKind::Resolver, tags)
    }

    /// Runs `work` inside the given timer. The timing is recorded whatever
    /// `work` returns, and a backend failure is logged rather than
    /// surfaced, so the engine's result passes through untouched.
    pub fn instrument<T>(&self, timer: PhaseTimer, work: impl FnOnce() -> T) -> T {
        let output = work();
        if let Err(err) = timer.finish() {
            warn!(
                target = "graphql_timer.observer",
                error = %err,
                "timer_record_failed"
            );
        }
        output
    }

    fn begin_query_phase(&self, state: &RequestState, phase: Phase) -> PhaseTimer {
        if !self.config.enabled {
            return PhaseTimer::noop();
        }
        let mut tags = identity_tags(state);
        tags.push(Tag::new(OPERATION_TAG, phase.as_str()));
        self.start(phase.kind(), tags)
    }

    fn start(&self, kind: MetricKind, tags: Vec<Tag>) -> PhaseTimer {
        let name = match kind {
            MetricKind::Query => &self.config.query_timer_name,
            MetricKind::Resolver => &self.config.resolver_timer_name,
        };
        PhaseTimer {
            active: Some(ActiveTimer {
                started: Instant::now(),
                id: TimerId {
                    name: name.clone(),
                    description: self.config.description.clone(),
                    tags,
                },
                backend: self.backend.clone(),
            }),
        }
    }
}

fn identity_tags(state: &RequestState) -> Vec<Tag> {
    vec![
        Tag::new(OPERATION_NAME_TAG, state.operation_name()),
        Tag::new(QUERY_HASH_TAG, state.content_hash()),
    ]
}
