use crate::types::Decimal;
use std::{
    cmp::Ordering,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal should parse")
}

fn hash_of(value: &Decimal) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn decimal_equality_ignores_scale() {
    assert_eq!(dec("11"), dec("11.00"));
    assert_eq!(dec("0"), dec("-0.000"));
    assert_eq!(dec("1.5e2"), dec("150"));
    assert_eq!(hash_of(&dec("11")), hash_of(&dec("11.00")));
}

#[test]
fn decimal_order_is_numeric_across_magnitudes_and_signs() {
    let ascending = [
        "-123.0", "-11", "-10.1", "-0.5", "0", "0.1", "0.11", "0.2", "11", "123",
    ];

    for pair in ascending.windows(2) {
        assert_eq!(
            dec(pair[0]).cmp(&dec(pair[1])),
            Ordering::Less,
            "{} should sort before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn decimal_normalize_strips_trailing_zeros() {
    let normalized = dec("12.3400").normalize();

    assert_eq!(normalized.scale(), 2);
    assert_eq!(normalized.to_string(), "12.34");
    assert_eq!(dec("1200").normalize().scale(), -2);
}

#[test]
fn decimal_display_places_point_by_scale() {
    assert_eq!(Decimal::new(-5, 3).to_string(), "-0.005");
    assert_eq!(Decimal::new(12345, 2).to_string(), "123.45");
    assert_eq!(Decimal::new(7, -2).to_string(), "700");
}

#[test]
fn decimal_parse_rejects_garbage() {
    assert!("".parse::<Decimal>().is_err());
    assert!("1.2.3".parse::<Decimal>().is_err());
    assert!("abc".parse::<Decimal>().is_err());
    assert!("-".parse::<Decimal>().is_err());
    assert!("1e".parse::<Decimal>().is_err());
}

#[test]
fn decimal_extreme_scales_stay_distinct() {
    let larger = Decimal::new(1, i32::MIN);
    let smaller = Decimal::new(1, i32::MIN + 1);

    assert_eq!(larger.cmp(&smaller), Ordering::Greater);
    assert_ne!(hash_of(&larger), hash_of(&smaller));
    assert_eq!(Decimal::new(10, i32::MIN + 1), larger);
    assert_eq!(
        Decimal::new(10, i32::MIN).normalize().scale(),
        i64::from(i32::MIN) - 1
    );
}
