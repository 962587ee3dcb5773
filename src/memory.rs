use crate::metrics::{MetricsBackend, MetricsError, TimerHandle};
use crate::models::TimerId;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct TimerStats {
    count: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl TimerStats {
    fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }
}

/// Point-in-time view of one registered timer.
#[derive(Debug, Clone)]
pub struct TimerSnapshot {
    pub id: TimerId,
    pub count: u64,
    pub total: Duration,
    pub max: Duration,
}

impl TimerSnapshot {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.id.tag(key)
    }
}

/// Concurrent registry; registering the same id twice yields the same
/// underlying timer.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    timers: Arc<DashMap<TimerId, Arc<TimerStats>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// First timer named `name` whose tags include every `(key, value)`.
    pub fn find(&self, name: &str, tags: &[(&str, &str)]) -> Option<TimerSnapshot> {
        self.timers
            .iter()
            .find(|entry| entry.key().name == name && entry.key().has_tags(tags))
            .map(|entry| snapshot_of(entry.key(), entry.value()))
    }

    /// Every timer matching `name` and `tags`.
    pub fn find_all(&self, name: &str, tags: &[(&str, &str)]) -> Vec<TimerSnapshot> {
        self.timers
            .iter()
            .filter(|entry| entry.key().name == name && entry.key().has_tags(tags))
            .map(|entry| snapshot_of(entry.key(), entry.value()))
            .collect()
    }

    pub fn snapshot(&self) -> Vec<TimerSnapshot> {
        self.timers
            .iter()
            .map(|entry| snapshot_of(entry.key(), entry.value()))
            .collect()
    }

    pub fn clear(&self) {
        self.timers.clear();
    }
}

fn snapshot_of(id: &TimerId, stats: &TimerStats) -> TimerSnapshot {
    TimerSnapshot {
        id: id.clone(),
        count: stats.count.load(Ordering::Relaxed),
        total: Duration::from_nanos(stats.total_nanos.load(Ordering::Relaxed)),
        max: Duration::from_nanos(stats.max_nanos.load(Ordering::Relaxed)),
    }
}

fn is_valid_tag_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl MetricsBackend for InMemoryBackend {
    fn register_timer(&self, id: &TimerId) -> Result<Box<dyn TimerHandle>, MetricsError> {
        if id.name.trim().is_empty() {
            return Err(MetricsError::InvalidName(id.name.clone()));
        }
        if let Some(bad) = id.tags.iter().find(|tag| !is_valid_tag_key(tag.key)) {
            return Err(MetricsError::InvalidTag {
                metric: id.name.clone(),
                key: bad.key.to_string(),
            });
        }
        let stats = self.timers.entry(id.clone()).or_default().clone();
        Ok(Box::new(MemoryTimer(stats)))
    }
}

struct MemoryTimer(Arc<TimerStats>);

impl TimerHandle for MemoryTimer {
    fn record(&self, elapsed: Duration) {
        self.0.record(elapsed);
    }
}
