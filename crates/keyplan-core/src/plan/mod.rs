//! Module: plan
//! Responsibility: index scoring, candidate ranking, and composition of the
//! winning access paths into a plan tree.
//! Does not own: predicate normalisation (see `predicate`) or execution
//! (see `executor`).
//! Boundary: plans are pure data; building one never touches a backend.

mod composite;
mod filtering;
mod hints;
mod node;
mod ordering;
mod planner;
mod range;


pub use composite::CompositeScore;
pub use filtering::{FilteringScore, RangeBound};
pub use hints::{QueryHint, QueryHints};
pub use node::{PlanNode, QueryPlan};
pub use ordering::OrderingScore;
pub use planner::plan_query;
pub use range::key_range;

// re-exports
pub use crate::obs::PlanKind;
