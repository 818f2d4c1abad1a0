use crate::{
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    predicate::{Predicate, eval},
    store::{Cursor, Record},
};
use std::sync::Arc;

///
/// FilterCursor
///
/// Residual filter stage. Rejected rows are counted and reported once.
///

pub(crate) struct FilterCursor<R> {
    input: Box<dyn Cursor<R>>,
    predicate: Predicate,
    sink: Arc<dyn MetricsSink>,
    rejected: u64,
    done: bool,
}

impl<R> FilterCursor<R> {
    pub(crate) fn new(
        input: Box<dyn Cursor<R>>,
        predicate: Predicate,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            input,
            predicate,
            sink,
            rejected: 0,
            done: false,
        }
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.sink.record(MetricsEvent::RowsFiltered {
                rows: self.rejected,
            });
        }
    }
}

impl<R: Record + Send> Cursor<R> for FilterCursor<R> {
    fn next(&mut self) -> Result<Option<R>, InternalError> {
        if self.done {
            return Ok(None);
        }

        while let Some(row) = self.input.next()? {
            if eval(&row, &self.predicate) {
                return Ok(Some(row));
            }
            self.rejected += 1;
        }

        self.finish();
        Ok(None)
    }

    fn close(&mut self) {
        self.input.close();
        self.finish();
    }
}
