//! Metrics sink boundary.
//!
//! Executor stages MUST NOT keep their own counters.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use derive_more::Display;
use std::sync::atomic::{AtomicU64, Ordering};

///
/// PlanKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum PlanKind {
    #[display("empty")]
    Empty,
    #[display("index_scan")]
    IndexScan,
    #[display("full_scan")]
    FullScan,
    #[display("union")]
    Union,
    #[display("intersection")]
    Intersection,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    PlanSelected { kind: PlanKind },
    /// Rows read from the backend by one scan stage.
    RowsScanned { rows: u64 },
    /// Rows rejected by one filter stage.
    RowsFiltered { rows: u64 },
    /// Rows buffered and sorted by one sort run.
    RowsSorted { rows: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// NoopSink
/// Default sink; drops every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _event: MetricsEvent) {}
}

///
/// CountingSink
///
/// Process-local counters, one per event kind.
/// Safe to share between concurrently running executors.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    plan_empty: AtomicU64,
    plan_index_scan: AtomicU64,
    plan_full_scan: AtomicU64,
    plan_union: AtomicU64,
    plan_intersection: AtomicU64,
    rows_scanned: AtomicU64,
    rows_filtered: AtomicU64,
    rows_sorted: AtomicU64,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn plans(&self, kind: PlanKind) -> u64 {
        self.plan_counter(kind).load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rows_scanned(&self) -> u64 {
        self.rows_scanned.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rows_filtered(&self) -> u64 {
        self.rows_filtered.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rows_sorted(&self) -> u64 {
        self.rows_sorted.load(Ordering::Relaxed)
    }

    /// Reset every counter to zero.
    pub fn reset(&self) {
        for counter in [
            &self.plan_empty,
            &self.plan_index_scan,
            &self.plan_full_scan,
            &self.plan_union,
            &self.plan_intersection,
            &self.rows_scanned,
            &self.rows_filtered,
            &self.rows_sorted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    const fn plan_counter(&self, kind: PlanKind) -> &AtomicU64 {
        match kind {
            PlanKind::Empty => &self.plan_empty,
            PlanKind::IndexScan => &self.plan_index_scan,
            PlanKind::FullScan => &self.plan_full_scan,
            PlanKind::Union => &self.plan_union,
            PlanKind::Intersection => &self.plan_intersection,
        }
    }
}

impl MetricsSink for CountingSink {
    fn record(&self, event: MetricsEvent) {
        let (counter, delta) = match event {
            MetricsEvent::PlanSelected { kind } => (self.plan_counter(kind), 1),
            MetricsEvent::RowsScanned { rows } => (&self.rows_scanned, rows),
            MetricsEvent::RowsFiltered { rows } => (&self.rows_filtered, rows),
            MetricsEvent::RowsSorted { rows } => (&self.rows_sorted, rows),
        };

        counter.fetch_add(delta, Ordering::Relaxed);
    }
}
