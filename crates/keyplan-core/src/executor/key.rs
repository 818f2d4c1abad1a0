use crate::{
    error::InternalError,
    model::ordering::OrderingSpec,
    store::{Cursor, Record},
    value::Value,
};
use std::cmp::Ordering;

/// Values of `record` for each ordering term; missing values are null.
pub(crate) fn order_key<R: Record + ?Sized>(record: &R, ordering: &OrderingSpec) -> Vec<Value> {
    ordering
        .terms()
        .iter()
        .map(|term| record.value(&term.property).unwrap_or(Value::Null))
        .collect()
}

/// Compare two keys extracted with the same `ordering`.
pub(crate) fn compare_keys(ordering: &OrderingSpec, a: &[Value], b: &[Value]) -> Ordering {
    ordering
        .terms()
        .iter()
        .zip(a.iter().zip(b))
        .map(|(term, (left, right))| term.direction.apply(left.cmp_natural(right)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Pull the next row of a stream that must be sorted by `ordering`.
///
/// `last` holds the key of the previous row and is advanced; a row that
/// sorts before it breaks the merge contract.
pub(crate) fn pull_ordered<R: Record>(
    input: &mut dyn Cursor<R>,
    ordering: &OrderingSpec,
    last: &mut Option<Vec<Value>>,
    stage: &str,
) -> Result<Option<(Vec<Value>, R)>, InternalError> {
    let Some(row) = input.next()? else {
        return Ok(None);
    };

    let key = order_key(&row, ordering);
    if let Some(previous) = last.as_deref()
        && compare_keys(ordering, &key, previous).is_lt()
    {
        return Err(InternalError::executor_invariant(format!(
            "{stage} input is not sorted by {ordering}"
        )));
    }
    *last = Some(key.clone());

    Ok(Some((key, row)))
}
