use crate::error::InternalError;
use std::collections::VecDeque;

///
/// Cursor
///
/// Lazy, forward-only stream of items.
///
/// After `close` (or after the stream is exhausted) `next` keeps returning
/// `Ok(None)`. Wrapping cursors must forward `close` to every upstream
/// cursor they own.
///

pub trait Cursor<T>: Send {
    fn next(&mut self) -> Result<Option<T>, InternalError>;

    fn close(&mut self);
}

impl<T, C: Cursor<T> + ?Sized> Cursor<T> for Box<C> {
    fn next(&mut self) -> Result<Option<T>, InternalError> {
        (**self).next()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

///
/// VecCursor
///
/// Cursor over an owned, already materialised snapshot.
///

pub struct VecCursor<T> {
    items: VecDeque<T>,
}

impl<T> VecCursor<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<T: Send> Cursor<T> for VecCursor<T> {
    fn next(&mut self) -> Result<Option<T>, InternalError> {
        Ok(self.items.pop_front())
    }

    fn close(&mut self) {
        self.items.clear();
    }
}
