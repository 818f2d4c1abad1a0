//! Module: executor
//! Responsibility: turn a composed plan into a lazy cursor tree over a
//! storage backend.
//! Does not own: access-path selection (see `plan`) or storage (see
//! `store`).
//! Boundary: executors hold no locks and never retry; backend errors reach
//! the caller unchanged.

mod filter;
mod key;
mod merge;
mod scan;
mod sort;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    model::schema::RecordSchema,
    obs::{MetricsEvent, MetricsSink, NoopSink},
    plan::{PlanNode, QueryPlan},
    store::{Cursor, Record, StorageBackend, VecCursor},
};
use filter::FilterCursor;
use merge::{IntersectionCursor, UnionCursor};
use scan::ScanCursor;
use sort::SortCursor;
use std::sync::Arc;
use tracing::trace;

///
/// Executor
///
/// A plan bound to a backend. Every `fetch` opens a fresh cursor tree, so
/// one executor can be run any number of times.
///

pub struct Executor<R> {
    plan: QueryPlan,
    backend: Arc<dyn StorageBackend<R>>,
    schema: Arc<RecordSchema>,
    sink: Arc<dyn MetricsSink>,
}

/// Bind `plan` to `backend`.
///
/// Fails when the plan scans an index `schema` does not declare.
pub fn build_executor<R>(
    plan: QueryPlan,
    backend: Arc<dyn StorageBackend<R>>,
    schema: Arc<RecordSchema>,
) -> Result<Executor<R>, InternalError>
where
    R: Record + Send + 'static,
{
    for index in plan.root.scanned_indexes() {
        if schema.index(&index.name) != Some(index) {
            return Err(InternalError::planner_invariant(format!(
                "plan scans index '{}' which schema '{}' does not declare",
                index.name, schema.name
            )));
        }
    }

    Ok(Executor {
        plan,
        backend,
        schema,
        sink: Arc::new(NoopSink),
    })
}

impl<R> Executor<R>
where
    R: Record + Send + 'static,
{
    /// Report metrics to `sink` instead of dropping them.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    #[must_use]
    pub fn explain(&self) -> String {
        self.plan.explain()
    }

    /// Open a new cursor over the plan's results.
    pub fn fetch(&self) -> Result<Box<dyn Cursor<R>>, InternalError> {
        self.sink.record(MetricsEvent::PlanSelected {
            kind: self.plan.kind,
        });

        self.open(&self.plan.root)
    }

    /// Drain a fresh cursor into a vector.
    pub fn collect(&self) -> Result<Vec<R>, InternalError> {
        let mut cursor = self.fetch()?;
        let mut rows = Vec::new();
        while let Some(row) = cursor.next()? {
            rows.push(row);
        }
        cursor.close();

        Ok(rows)
    }

    fn open(&self, node: &PlanNode) -> Result<Box<dyn Cursor<R>>, InternalError> {
        let cursor: Box<dyn Cursor<R>> = match node {
            PlanNode::Empty => {
                trace!("opening empty stage");
                Box::new(VecCursor::new(Vec::new()))
            }
            PlanNode::IndexScan {
                index,
                range,
                reverse,
            } => {
                trace!(index = %index.name, range = %range, reverse, "opening index scan");
                let inner = self.backend.scan(index, range, *reverse)?;
                Box::new(ScanCursor::index(inner, Arc::clone(&self.sink)))
            }
            PlanNode::FullScan => {
                trace!(record = %self.schema.name, "opening full scan");
                let inner = self.backend.full_scan()?;
                Box::new(ScanCursor::full(inner, Arc::clone(&self.sink)))
            }
            PlanNode::Filter { input, predicate } => {
                trace!(predicate = %predicate, "opening filter");
                Box::new(FilterCursor::new(
                    self.open(input)?,
                    predicate.clone(),
                    Arc::clone(&self.sink),
                ))
            }
            PlanNode::Sort {
                input,
                handled,
                remaining,
            } => {
                trace!(handled = %handled, remaining = %remaining, "opening sort");
                Box::new(SortCursor::new(
                    self.open(input)?,
                    handled.clone(),
                    remaining.clone(),
                    self.plan.sort_buffer_limit,
                    Arc::clone(&self.sink),
                ))
            }
            PlanNode::Union { inputs, ordering } => {
                trace!(inputs = inputs.len(), ordering = %ordering, "opening union");
                Box::new(UnionCursor::new(self.open_all(inputs)?, ordering.clone()))
            }
            PlanNode::Intersection { left, right } => {
                trace!("opening intersection");
                let mut left = self.open(left)?;
                let right = match self.open(right) {
                    Ok(right) => right,
                    Err(err) => {
                        left.close();
                        return Err(err);
                    }
                };

                Box::new(IntersectionCursor::new(
                    left,
                    right,
                    self.schema.primary_key_ordering(),
                ))
            }
        };

        Ok(cursor)
    }

    // Open every input; on failure, close the ones already opened.
    fn open_all(&self, nodes: &[PlanNode]) -> Result<Vec<Box<dyn Cursor<R>>>, InternalError> {
        let mut opened: Vec<Box<dyn Cursor<R>>> = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.open(node) {
                Ok(cursor) => opened.push(cursor),
                Err(err) => {
                    for cursor in &mut opened {
                        cursor.close();
                    }
                    return Err(err);
                }
            }
        }

        Ok(opened)
    }
}
