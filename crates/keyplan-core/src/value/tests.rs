use crate::{types::Decimal, value::Value};
use keyplan_primitives::ScalarKind;
use num_bigint::BigInt;
use std::cmp::Ordering;

#[test]
fn null_is_below_every_value() {
    let values = [
        Value::Bool(false),
        Value::Int8(i8::MIN),
        Value::Int64(i64::MIN),
        Value::Float64(f64::NEG_INFINITY),
        Value::Decimal(Decimal::from(-1)),
        Value::Text(String::new()),
        Value::Blob(Vec::new()),
    ];

    for value in values {
        assert_eq!(Value::Null.cmp(&value), Ordering::Less, "{value}");
    }
}

#[test]
fn float_nan_payloads_compare_equal() {
    let quiet = Value::Float64(f64::NAN);
    let other = Value::Float64(f64::from_bits(0x7FF0_0000_0000_0001));

    assert_eq!(quiet, other);
    assert!(Value::Float64(f64::INFINITY) < quiet);
    assert!(Value::Float32(-0.0) < Value::Float32(0.0));
}

#[test]
fn decimals_compare_numerically() {
    assert_eq!(
        Value::Decimal(Decimal::new(1100, 2)),
        Value::Decimal(Decimal::from(11))
    );
    assert!(Value::Decimal(Decimal::new(-101, 1)) > Value::Decimal(Decimal::from(-11)));
}

#[test]
fn kind_matching_honours_nullability() {
    assert!(Value::Null.matches_kind(ScalarKind::Int32, true));
    assert!(!Value::Null.matches_kind(ScalarKind::Int32, false));
    assert!(Value::Int32(3).matches_kind(ScalarKind::Int32, false));
    assert!(!Value::Int64(3).matches_kind(ScalarKind::Int32, true));
    assert_eq!(Value::Null.kind(), None);
    assert_eq!(Value::IntBig(BigInt::from(2)).kind(), Some(ScalarKind::IntBig));
}

#[test]
fn conversions_cover_option_and_str() {
    assert_eq!(Value::from("a"), Value::Text("a".to_string()));
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some(4i64)), Value::Int64(4));
}

#[test]
fn display_renders_literals() {
    assert_eq!(Value::from("x").to_string(), "\"x\"");
    assert_eq!(Value::Blob(vec![0x0A, 0xFF]).to_string(), "0x0aff");
    assert_eq!(Value::Char('z').to_string(), "'z'");
    assert_eq!(Value::Null.to_string(), "null");
}
