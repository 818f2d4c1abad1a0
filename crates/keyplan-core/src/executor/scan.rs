use crate::{
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    store::{Cursor, IndexEntry},
};
use std::sync::Arc;

///
/// ScanCursor
///
/// Leaf stage over a backend cursor. Counts the rows it reads and reports
/// them once, when the stream ends or is closed.
///

pub(crate) struct ScanCursor<T, R> {
    inner: Box<dyn Cursor<T>>,
    extract: fn(T) -> R,
    sink: Arc<dyn MetricsSink>,
    rows: u64,
    done: bool,
}

impl<T, R> ScanCursor<T, R> {
    pub(crate) fn new(
        inner: Box<dyn Cursor<T>>,
        extract: fn(T) -> R,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            inner,
            extract,
            sink,
            rows: 0,
            done: false,
        }
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.sink.record(MetricsEvent::RowsScanned { rows: self.rows });
        }
    }
}

impl<R> ScanCursor<IndexEntry<R>, R> {
    pub(crate) fn index(
        inner: Box<dyn Cursor<IndexEntry<R>>>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::new(inner, entry_record, sink)
    }
}

impl<R> ScanCursor<R, R> {
    pub(crate) fn full(inner: Box<dyn Cursor<R>>, sink: Arc<dyn MetricsSink>) -> Self {
        Self::new(inner, std::convert::identity, sink)
    }
}

fn entry_record<R>(entry: IndexEntry<R>) -> R {
    entry.record
}

impl<T: Send, R: Send> Cursor<R> for ScanCursor<T, R> {
    fn next(&mut self) -> Result<Option<R>, InternalError> {
        if self.done {
            return Ok(None);
        }

        match self.inner.next()? {
            Some(item) => {
                self.rows += 1;
                Ok(Some((self.extract)(item)))
            }
            None => {
                self.finish();
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.inner.close();
        self.finish();
    }
}
