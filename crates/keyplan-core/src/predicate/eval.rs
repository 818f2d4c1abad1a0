use crate::{
    predicate::{ComparePredicate, Predicate},
    store::Record,
    value::Value,
};

/// Evaluate one comparison; a missing value is null.
#[must_use]
pub fn eval_compare<R: Record + ?Sized>(record: &R, cmp: &ComparePredicate) -> bool {
    let value = record.value(&cmp.property).unwrap_or(Value::Null);

    cmp.op.accepts(value.cmp_natural(&cmp.value))
}

/// Evaluate a conjunction of comparison terms.
#[must_use]
pub fn eval_terms<R: Record + ?Sized>(record: &R, terms: &[ComparePredicate]) -> bool {
    terms.iter().all(|term| eval_compare(record, term))
}

/// Evaluate an arbitrary predicate tree.
#[must_use]
pub fn eval<R: Record + ?Sized>(record: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::False => false,
        Predicate::And(preds) => preds.iter().all(|pred| eval(record, pred)),
        Predicate::Or(preds) => preds.iter().any(|pred| eval(record, pred)),
        Predicate::Not(pred) => !eval(record, pred),
        Predicate::Compare(cmp) => eval_compare(record, cmp),
    }
}
