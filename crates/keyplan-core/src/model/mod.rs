//! Runtime data model definitions.
//!
//! Types in `model` are built once when a record type is registered and are
//! then shared read-only by the planner, the executors, and storage
//! backends. In general:
//! - `model` describes what exists (properties, indexes, orderings)
//! - `plan` decides how to read it

pub mod index;
pub mod ordering;
pub mod property;
pub mod schema;
