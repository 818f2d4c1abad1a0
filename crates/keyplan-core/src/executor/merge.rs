use crate::{
    error::InternalError,
    executor::key::{compare_keys, pull_ordered},
    model::ordering::OrderingSpec,
    store::{Cursor, Record},
    value::Value,
};
use std::cmp::Ordering;

type Keyed<R> = (Vec<Value>, R);

///
/// UnionCursor
///
/// k-way merge of inputs sorted by one total ordering. The ordering ends
/// with the primary key, so duplicates arrive adjacent and only the first
/// is emitted.
///

pub(crate) struct UnionCursor<R> {
    inputs: Vec<Box<dyn Cursor<R>>>,
    ordering: OrderingSpec,
    heads: Vec<Option<Keyed<R>>>,
    lasts: Vec<Option<Vec<Value>>>,
    emitted: Option<Vec<Value>>,
    primed: bool,
    done: bool,
}

impl<R: Record + Send> UnionCursor<R> {
    pub(crate) fn new(inputs: Vec<Box<dyn Cursor<R>>>, ordering: OrderingSpec) -> Self {
        let width = inputs.len();

        Self {
            inputs,
            ordering,
            heads: (0..width).map(|_| None).collect(),
            lasts: vec![None; width],
            emitted: None,
            primed: false,
            done: false,
        }
    }

    fn pull(&mut self, input: usize) -> Result<Option<Keyed<R>>, InternalError> {
        pull_ordered(
            self.inputs[input].as_mut(),
            &self.ordering,
            &mut self.lasts[input],
            "union",
        )
    }

    // Position of the smallest head; the earliest input wins ties.
    fn min_head(&self) -> Option<usize> {
        self.heads
            .iter()
            .enumerate()
            .filter_map(|(position, head)| head.as_ref().map(|(key, _)| (position, key)))
            .min_by(|(_, a), (_, b)| compare_keys(&self.ordering, a, b))
            .map(|(position, _)| position)
    }
}

impl<R: Record + Send> Cursor<R> for UnionCursor<R> {
    fn next(&mut self) -> Result<Option<R>, InternalError> {
        if self.done {
            return Ok(None);
        }
        if !self.primed {
            for input in 0..self.inputs.len() {
                self.heads[input] = self.pull(input)?;
            }
            self.primed = true;
        }

        loop {
            let Some(position) = self.min_head() else {
                self.done = true;
                return Ok(None);
            };
            let Some((key, row)) = self.heads[position].take() else {
                return Err(InternalError::executor_invariant("union head vanished"));
            };
            self.heads[position] = self.pull(position)?;

            let duplicate = self
                .emitted
                .as_deref()
                .is_some_and(|emitted| compare_keys(&self.ordering, emitted, &key).is_eq());
            if duplicate {
                continue;
            }

            self.emitted = Some(key);
            return Ok(Some(row));
        }
    }

    fn close(&mut self) {
        for input in &mut self.inputs {
            input.close();
        }
        for head in &mut self.heads {
            *head = None;
        }
        self.done = true;
    }
}

///
/// IntersectionCursor
///
/// Merge of two primary-key-sorted inputs emitting rows present in both.
/// The left row is the one returned.
///

pub(crate) struct IntersectionCursor<R> {
    left: Box<dyn Cursor<R>>,
    right: Box<dyn Cursor<R>>,
    primary_key: OrderingSpec,
    left_head: Option<Keyed<R>>,
    right_head: Option<Keyed<R>>,
    left_last: Option<Vec<Value>>,
    right_last: Option<Vec<Value>>,
    done: bool,
}

impl<R: Record + Send> IntersectionCursor<R> {
    pub(crate) fn new(
        left: Box<dyn Cursor<R>>,
        right: Box<dyn Cursor<R>>,
        primary_key: OrderingSpec,
    ) -> Self {
        Self {
            left,
            right,
            primary_key,
            left_head: None,
            right_head: None,
            left_last: None,
            right_last: None,
            done: false,
        }
    }
}

impl<R: Record + Send> Cursor<R> for IntersectionCursor<R> {
    fn next(&mut self) -> Result<Option<R>, InternalError> {
        if self.done {
            return Ok(None);
        }

        loop {
            if self.left_head.is_none() {
                self.left_head = pull_ordered(
                    self.left.as_mut(),
                    &self.primary_key,
                    &mut self.left_last,
                    "intersection",
                )?;
            }
            if self.right_head.is_none() {
                self.right_head = pull_ordered(
                    self.right.as_mut(),
                    &self.primary_key,
                    &mut self.right_last,
                    "intersection",
                )?;
            }

            let (Some((left_key, _)), Some((right_key, _))) = (&self.left_head, &self.right_head)
            else {
                // one side is exhausted; nothing further can match
                self.close();
                return Ok(None);
            };

            match compare_keys(&self.primary_key, left_key, right_key) {
                Ordering::Less => self.left_head = None,
                Ordering::Greater => self.right_head = None,
                Ordering::Equal => {
                    self.right_head = None;
                    return Ok(self.left_head.take().map(|(_, row)| row));
                }
            }
        }
    }

    fn close(&mut self) {
        self.left.close();
        self.right.close();
        self.left_head = None;
        self.right_head = None;
        self.done = true;
    }
}
