use crate::{
    error::InternalError,
    executor::key::{compare_keys, order_key},
    model::ordering::OrderingSpec,
    obs::{MetricsEvent, MetricsSink},
    store::{Cursor, Record},
    value::Value,
};
use std::{cmp::Ordering, collections::VecDeque, sync::Arc};

///
/// SortCursor
///
/// Completes an ordering the input only partly delivers.
///
/// The input is sorted by `handled`. Each run of rows with equal `handled`
/// values is buffered and stable-sorted by `remaining`, so rows that tie on
/// every term keep their encounter order. An empty `handled` makes the
/// whole input one run.
///

pub(crate) struct SortCursor<R> {
    input: Box<dyn Cursor<R>>,
    handled: OrderingSpec,
    remaining: OrderingSpec,
    limit: usize,
    sink: Arc<dyn MetricsSink>,
    run: VecDeque<R>,
    // first row of the next run, already pulled from the input
    pending: Option<(Vec<Value>, R)>,
    done: bool,
}

impl<R: Record + Send> SortCursor<R> {
    pub(crate) fn new(
        input: Box<dyn Cursor<R>>,
        handled: OrderingSpec,
        remaining: OrderingSpec,
        limit: usize,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            input,
            handled,
            remaining,
            limit,
            sink,
            run: VecDeque::new(),
            pending: None,
            done: false,
        }
    }

    fn pull(&mut self) -> Result<Option<(Vec<Value>, R)>, InternalError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        Ok(self.input.next()?.map(|row| (order_key(&row, &self.handled), row)))
    }

    // Buffer and sort the next run; false once the input is exhausted.
    fn fill_run(&mut self) -> Result<bool, InternalError> {
        let Some((run_key, first)) = self.pull()? else {
            return Ok(false);
        };

        let mut rows = vec![first];
        while let Some(row) = self.input.next()? {
            let key = order_key(&row, &self.handled);
            match compare_keys(&self.handled, &key, &run_key) {
                Ordering::Equal => {
                    if rows.len() >= self.limit {
                        return Err(InternalError::executor_unsupported(format!(
                            "sort run exceeds the buffer limit of {} rows",
                            self.limit
                        )));
                    }
                    rows.push(row);
                }
                Ordering::Greater => {
                    self.pending = Some((key, row));
                    break;
                }
                Ordering::Less => {
                    return Err(InternalError::executor_invariant(format!(
                        "sort input is not ordered by {}",
                        self.handled
                    )));
                }
            }
        }

        let mut keyed: Vec<(Vec<Value>, R)> = rows
            .into_iter()
            .map(|row| (order_key(&row, &self.remaining), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare_keys(&self.remaining, a, b));

        self.sink.record(MetricsEvent::RowsSorted {
            rows: keyed.len() as u64,
        });
        self.run = keyed.into_iter().map(|(_, row)| row).collect();

        Ok(true)
    }
}

impl<R: Record + Send> Cursor<R> for SortCursor<R> {
    fn next(&mut self) -> Result<Option<R>, InternalError> {
        loop {
            if let Some(row) = self.run.pop_front() {
                return Ok(Some(row));
            }
            if self.done {
                return Ok(None);
            }
            if !self.fill_run()? {
                self.done = true;
            }
        }
    }

    fn close(&mut self) {
        self.input.close();
        self.run.clear();
        self.pending = None;
        self.done = true;
    }
}
