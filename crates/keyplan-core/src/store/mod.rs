//! Module: store
//! Responsibility: the contract between composed executors and a storage
//! backend, plus an in-memory reference backend.
//! Does not own: planning, filtering, or sorting.
//! Boundary: backends compare keys as plain bytes and must honour
//! [`KeyRange`] exactly; the planner's correctness depends on it.

mod cursor;
mod memory;
mod range;


use crate::{codec::EncodedKey, model::index::IndexSpec, value::Value};
use std::error::Error as StdError;
use thiserror::Error as ThisError;

pub use cursor::{Cursor, VecCursor};
pub use memory::MemoryBackend;
pub use range::KeyRange;

///
/// Record
///
/// Read access to one stored record. Chained properties are addressed by
/// their dotted path. `None` means the record has no value for the
/// property, which the core treats as null.
///

pub trait Record {
    fn value(&self, property: &str) -> Option<Value>;
}

///
/// IndexEntry
///
/// One index entry as returned by a scan: the stored component key and the
/// record it points at.
///

#[derive(Clone, Debug)]
pub struct IndexEntry<R> {
    pub key: EncodedKey,
    pub record: R,
}

///
/// BackendError
///
/// Failure raised by a storage backend. Executors surface it unchanged as a
/// backend failure; the core never retries.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

///
/// StorageBackend
///
/// Scan primitives supplied by the storage engine.
///
/// `scan` yields the entries of `index` whose key falls inside `range`, in
/// ascending byte order, or descending when `reverse` is set. `full_scan`
/// yields every record in primary-key order. Each returned cursor must be a
/// read-consistent view; concurrent writers must not tear it.
///

pub trait StorageBackend<R>: Send + Sync {
    fn scan(
        &self,
        index: &IndexSpec,
        range: &KeyRange,
        reverse: bool,
    ) -> Result<Box<dyn Cursor<IndexEntry<R>>>, BackendError>;

    fn full_scan(&self) -> Result<Box<dyn Cursor<R>>, BackendError>;
}
