use crate::value::Value;
use std::cmp::Ordering;

/// Collapse every NaN payload into the canonical quiet NaN so that
/// comparison and key encoding agree on a single NaN position.
#[must_use]
pub(crate) const fn canonical_f64(value: f64) -> f64 {
    if value.is_nan() { f64::NAN } else { value }
}

#[must_use]
pub(crate) const fn canonical_f32(value: f32) -> f32 {
    if value.is_nan() { f32::NAN } else { value }
}

// Stable rank used only when two values of different kinds meet.
const fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int8(_) => 2,
        Value::Int16(_) => 3,
        Value::Uint16(_) => 4,
        Value::Char(_) => 5,
        Value::Int32(_) => 6,
        Value::Int64(_) => 7,
        Value::Float32(_) => 8,
        Value::Float64(_) => 9,
        Value::IntBig(_) => 10,
        Value::Decimal(_) => 11,
        Value::Text(_) => 12,
        Value::Blob(_) => 13,
    }
}

pub(super) fn cmp_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int8(a), Value::Int8(b)) => a.cmp(b),
        (Value::Int16(a), Value::Int16(b)) => a.cmp(b),
        (Value::Uint16(a), Value::Uint16(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
        (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
        (Value::Float32(a), Value::Float32(b)) => {
            canonical_f32(*a).total_cmp(&canonical_f32(*b))
        }
        (Value::Float64(a), Value::Float64(b)) => {
            canonical_f64(*a).total_cmp(&canonical_f64(*b))
        }
        (Value::IntBig(a), Value::IntBig(b)) => a.cmp(b),
        (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        _ => kind_rank(left).cmp(&kind_rank(right)),
    }
}
