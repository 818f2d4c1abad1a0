//! Observability: executor telemetry and the sink abstraction it flows
//! through.
//!
//! Planning and execution never hold counters themselves; every event is
//! handed to an injected [`MetricsSink`].

mod sink;


pub use sink::{CountingSink, MetricsEvent, MetricsSink, NoopSink, PlanKind};
