//! Core runtime for keyplan: order-preserving key codecs, index scoring,
//! plan composition, and the executor stages that backends feed.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod obs;
pub mod plan;
pub mod predicate;
pub mod store;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of properties allowed in one index declaration.
///
/// Keeps composite index keys within bounded sizes and keeps scoring
/// loops trivially cheap.
pub const MAX_INDEX_PROPERTIES: usize = 8;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        codec::{Direction, EncodedKey},
        model::{
            index::{IndexProperty, IndexSpec},
            ordering::{OrderingSpec, OrderingTerm},
            schema::{PropertyModel, RecordSchema},
        },
        plan::{QueryHint, QueryHints},
        predicate::{CompareOp, Predicate},
        store::Record,
        types::Decimal,
        value::Value,
    };
}
