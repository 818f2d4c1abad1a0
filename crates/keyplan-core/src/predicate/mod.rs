//! Module: predicate
//! Responsibility: filter AST, schema validation, normalisation, and
//! residual evaluation.
//! Does not own: index matching (see `plan`).

mod ast;
mod eval;
mod normalize;
mod validate;


pub use ast::{CompareOp, ComparePredicate, Predicate};
pub use eval::{eval, eval_compare, eval_terms};
pub use normalize::{Conjunction, Dnf, DnfOverflow, normalize};
pub use validate::{ValidateError, validate};
