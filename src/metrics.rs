use crate::models::TimerId;
use ::metrics::{Label, Unit};
use dashmap::DashSet;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("invalid metric name: {0:?}")]
    InvalidName(String),
    #[error("invalid tag key {key:?} on metric {metric}")]
    InvalidTag { metric: String, key: String },
    #[error("registration rejected: {0}")]
    Rejected(String),
}

/// Receives elapsed time for one registered timer.
pub trait TimerHandle: Send {
    fn record(&self, elapsed: Duration);
}

/// A metrics registry able to hand out timers from any thread.
pub trait MetricsBackend: Send + Sync {
    fn register_timer(&self, id: &TimerId) -> Result<Box<dyn TimerHandle>, MetricsError>;
}

impl<B: MetricsBackend + ?Sized> MetricsBackend for Arc<B> {
    fn register_timer(&self, id: &TimerId) -> Result<Box<dyn TimerHandle>, MetricsError> {
        (**self).register_timer(id)
    }
}

/// Forwards timings to the process-wide `metrics` recorder, e.g. one
/// installed by `metrics-exporter-prometheus`.
///
/// Durations are recorded as seconds into a histogram named after the
/// timer, with one label per tag.
#[derive(Debug, Default)]
pub struct RecorderBackend {
    described: DashSet<String>,
}

impl RecorderBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricsBackend for RecorderBackend {
    fn register_timer(&self, id: &TimerId) -> Result<Box<dyn TimerHandle>, MetricsError> {
        if self.described.insert(id.name.clone()) {
            ::metrics::describe_histogram!(id.name.clone(), Unit::Seconds, id.description.clone());
        }
        let labels: Vec<Label> = id
            .tags
            .iter()
            .map(|tag| Label::new(tag.key, tag.value.clone()))
            .collect();
        let histogram = ::metrics::histogram!(id.name.clone(), labels);
        Ok(Box::new(RecorderTimer(histogram)))
    }
}

struct RecorderTimer(::metrics::Histogram);

impl TimerHandle for RecorderTimer {
    fn record(&self, elapsed: Duration) {
        self.0.record(elapsed.as_secs_f64());
    }
}

/// Writes every measurement as a trace event instead of storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBackend;

impl MetricsBackend for TracingBackend {
    fn register_timer(&self, id: &TimerId) -> Result<Box<dyn TimerHandle>, MetricsError> {
        Ok(Box::new(TracingTimer { id: id.clone() }))
    }
}

struct TracingTimer {
    id: TimerId,
}

impl TimerHandle for TracingTimer {
    fn record(&self, elapsed: Duration) {
        let tags = self
            .id
            .tags
            .iter()
            .map(|tag| format!("{}={}", tag.key, tag.value))
            .collect::<Vec<_>>()
            .join(",");
        trace!(
            target = "graphql_timer.metrics",
            metric = %self.id.name,
            tags = %tags,
            elapsed_us = elapsed.as_micros() as u64,
            "timer_recorded"
        );
    }
}
