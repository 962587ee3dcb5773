//! ```
//! use graphql_timer::{FieldFetch, InMemoryBackend, PhaseObserver};
//!
//! let backend = InMemoryBackend::new();
//! let observer = PhaseObserver::new(backend.clone());
//! let state = observer.create_state("query Hero { hero { name } }", None);
//!
//! observer.begin_parse(&state).finish().unwrap();
//! let fetch = FieldFetch::new("Query", "hero", false);
//! observer.begin_field_fetch(&state, &fetch).finish().unwrap();
//!
//! let parse = backend
//!     .find("graphql.timer.query", &[("operation", "parse")])
//!     .unwrap();
//! assert_eq!(parse.tag("operationName"), Some("Hero"));
//! ```

pub mod config;
pub mod memory;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod state;


pub use crate::config::{ConfigError, ObserverConfig};
pub use crate::memory::{InMemoryBackend, TimerSnapshot};
pub use crate::metrics::{
    MetricsBackend, MetricsError, RecorderBackend, TimerHandle, TracingBackend,
};
pub use crate::models::{MetricKind, Phase, Tag, TimerId};
pub use crate::observer::{FieldFetch, PhaseObserver, PhaseTimer};
pub use crate::state::{NameSource, RequestState};
