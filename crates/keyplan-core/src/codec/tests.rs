use crate::{
    codec::{
        Direction, EncodedKey, KeyCodec, KeyDecodeError, KeyEncodeError, KeyReader, KeyWriter,
        decode, decode_desc, decode_exact, decode_value, encode, encode_desc, encode_into,
        encode_str, encode_value, encoded_len, encoded_str_len, value_encoded_len,
    },
    types::Decimal,
    value::Value,
};
use keyplan_primitives::{ALL_SCALAR_KINDS, ScalarKind};
use num_bigint::{BigInt, Sign};
use proptest::prelude::*;
use std::{cmp::Ordering, fmt::Debug};

fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal should parse")
}

fn assert_round_trip<T: KeyCodec + Debug + PartialEq>(value: &T) {
    for direction in [Direction::Asc, Direction::Desc] {
        let bytes = encode(value, direction);
        assert_eq!(bytes.len(), value.encoded_len(), "length for {value:?}");

        let decoded: T = decode_exact(&bytes, direction).expect("round trip should decode");
        assert_eq!(&decoded, value, "round trip in {direction:?}");
    }
}

fn encode_dynamic(value: &Value, kind: ScalarKind, nullable: bool) -> Vec<u8> {
    let mut out = Vec::new();
    encode_value(value, kind, nullable, &mut KeyWriter::new(&mut out, Direction::Asc))
        .expect("value should encode");
    out
}

fn big_int_strategy() -> BoxedStrategy<BigInt> {
    (
        prop_oneof![Just(Sign::Minus), Just(Sign::NoSign), Just(Sign::Plus)],
        proptest::collection::vec(any::<u8>(), 0..24),
    )
        .prop_map(|(sign, magnitude)| BigInt::from_bytes_be(sign, &magnitude))
        .boxed()
}

fn decimal_strategy() -> BoxedStrategy<Decimal> {
    (any::<i64>(), -12i32..12)
        .prop_map(|(unscaled, scale)| Decimal::new(unscaled, scale))
        .boxed()
}

// ---------------------------------------------------------------------
// Fixed examples
// ---------------------------------------------------------------------

#[test]
fn decimal_sequence_encodes_strictly_increasing() {
    let sequence = ["-123.0", "-11", "-10.1", "0", "0.1", "11", "123"].map(dec);
    let encoded: Vec<_> = sequence
        .iter()
        .map(|value| encode(value, Direction::Asc))
        .collect();

    for pair in encoded.windows(2) {
        assert_eq!(pair[0].cmp(&pair[1]), Ordering::Less, "{pair:?}");
    }
}

#[test]
fn decimal_scale_does_not_change_encoding() {
    assert_eq!(
        encode(&dec("11"), Direction::Asc),
        encode(&dec("11.00"), Direction::Asc)
    );
    assert_eq!(
        encode(&dec("-0.500"), Direction::Desc),
        encode(&Decimal::new(-5, 1), Direction::Desc)
    );
    assert_eq!(encode(&dec("0.000"), Direction::Asc).as_bytes(), &[0x02]);
}

#[test]
fn signed_integers_flip_the_sign_bit() {
    assert_eq!(encode(&i32::MIN, Direction::Asc).as_bytes(), &[0, 0, 0, 0]);
    assert_eq!(encode(&-1i32, Direction::Asc).as_bytes(), &[0x7F, 0xFF, 0xFF, 0xFF]);
    assert_eq!(encode(&0i32, Direction::Asc).as_bytes(), &[0x80, 0, 0, 0]);
    assert_eq!(encode(&5i8, Direction::Asc).as_bytes(), &[0x85]);
}

#[test]
fn descending_is_bitwise_complement() {
    let asc = encode(&"key".to_string(), Direction::Asc);
    let desc = encode_desc(&"key".to_string());

    let complemented: Vec<u8> = asc.iter().map(|byte| !byte).collect();
    assert_eq!(desc.as_bytes(), complemented.as_slice());
}

#[test]
fn nullable_bool_stays_one_byte() {
    assert_eq!(encode(&None::<bool>, Direction::Asc).as_bytes(), &[0x00]);
    assert_eq!(encode(&Some(false), Direction::Asc).as_bytes(), &[0x01]);
    assert_eq!(encode(&Some(true), Direction::Asc).as_bytes(), &[0x02]);
    assert_eq!(encode(&Some(true), Direction::Desc).as_bytes(), &[0xFD]);
}

#[test]
fn nullable_fixed_width_uses_presence_marker() {
    assert_eq!(encode(&None::<i16>, Direction::Asc).as_bytes(), &[0x00]);
    assert_eq!(
        encode(&Some(1i16), Direction::Asc).as_bytes(),
        &[0x01, 0x80, 0x01]
    );
    assert_eq!(encode(&Some('A'), Direction::Asc).len(), 4);
}

#[test]
fn string_code_point_widths() {
    assert_eq!(encode_str("", Direction::Asc).as_bytes(), &[0x01]);
    assert_eq!(encode_str("a", Direction::Asc).as_bytes(), &[0x63, 0x01]);
    assert_eq!(encoded_str_len("\u{7E}"), 3);
    assert_eq!(encoded_str_len("\u{3F7E}"), 4);
    assert_eq!(encoded_str_len("\u{1F600}"), 4);
    assert_eq!(
        encode_str("é", Direction::Asc),
        encode(&"é".to_string(), Direction::Asc)
    );
}

#[test]
fn nullable_string_and_big_numbers_use_single_null_byte() {
    assert_eq!(encode(&None::<String>, Direction::Asc).as_bytes(), &[0x00]);
    assert_eq!(encode(&None::<BigInt>, Direction::Asc).as_bytes(), &[0x00]);
    assert_eq!(encode(&None::<Decimal>, Direction::Asc).as_bytes(), &[0x00]);

    // present values keep the non-null form, no extra marker
    assert_eq!(
        encode(&Some("x".to_string()), Direction::Asc),
        encode(&"x".to_string(), Direction::Asc)
    );
    assert_eq!(
        encode(&Some(BigInt::from(7)), Direction::Asc),
        encode(&BigInt::from(7), Direction::Asc)
    );
}

#[test]
fn blob_escapes_zero_bytes() {
    let value = vec![0x00u8, 0x01];
    assert_eq!(
        encode(&value, Direction::Asc).as_bytes(),
        &[0x00, 0xFF, 0x01, 0x00, 0x00]
    );
    assert_eq!(
        encode(&Some(Vec::<u8>::new()), Direction::Asc).as_bytes(),
        &[0x01, 0x00, 0x00]
    );
}

#[test]
fn decode_reports_consumed_length_at_offset() {
    let mut out = vec![0xAA];
    encode_into(&42i64, Direction::Asc, &mut out);
    encode_into(&"tail".to_string(), Direction::Asc, &mut out);

    let (value, consumed) = decode::<i64>(&out, 1, Direction::Asc).expect("i64 should decode");
    assert_eq!((value, consumed), (42, 8));

    let (text, consumed) =
        decode::<String>(&out, 9, Direction::Asc).expect("string should decode");
    assert_eq!(text, "tail");
    assert_eq!(consumed, encoded_len(&text));
}

#[test]
fn decode_desc_reads_descending_bytes() {
    let bytes = encode_desc(&Some(Decimal::from(-3)));
    let (value, consumed) = decode_desc::<Option<Decimal>>(&bytes, 0).expect("should decode");

    assert_eq!(value, Some(Decimal::from(-3)));
    assert_eq!(consumed, bytes.len());
}

// ---------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------

#[test]
fn truncated_buffers_are_rejected() {
    let bytes = encode(&123_456i64, Direction::Asc);
    let err = decode_exact::<i64>(&bytes[..5], Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::Truncated { needed: 8, .. }));

    let text = encode(&"abc".to_string(), Direction::Asc);
    let err = decode_exact::<String>(&text[..3], Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::Truncated { .. }));
}

#[test]
fn invalid_markers_are_rejected() {
    let err = decode_exact::<bool>(&[0x07], Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::InvalidMarker { marker: 0x07, .. }));

    let err = decode_exact::<BigInt>(&[0x09], Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::InvalidMarker { .. }));

    let err = decode_exact::<Option<i32>>(&[0x05, 0, 0, 0, 0], Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::InvalidMarker { .. }));
}

#[test]
fn invalid_blob_escape_is_rejected() {
    let err = decode_exact::<Vec<u8>>(&[0x01, 0x00, 0x07], Direction::Asc).unwrap_err();
    assert_eq!(
        err,
        KeyDecodeError::InvalidEscape {
            byte: 0x07,
            offset: 2
        }
    );
}

#[test]
fn surrogate_code_points_are_rejected() {
    // 0xD800 packs into the three-byte form
    let d = 0xD800u32 - 0x3F7E;
    let bytes = [
        0xC0 + u8::try_from(d >> 16).unwrap(),
        u8::try_from((d >> 8) & 0xFF).unwrap(),
        u8::try_from(d & 0xFF).unwrap(),
        0x01,
    ];
    let err = decode_exact::<String>(&bytes, Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::InvalidCodePoint { value: 0xD800, .. }));
}

#[test]
fn non_canonical_decimal_digits_are_rejected() {
    let mut bytes = encode(&dec("1.5"), Direction::Asc).into_vec();
    // append a trailing zero digit before the terminator
    let terminator = bytes.pop().unwrap();
    bytes.push(b'0');
    bytes.push(terminator);

    let err = decode_exact::<Decimal>(&bytes, Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::NonCanonical { .. }));
}

#[test]
fn decimal_extreme_scales_encode_distinctly_and_round_trip() {
    let values = [
        Decimal::new(1, i32::MIN),
        Decimal::new(1, i32::MIN + 1),
        Decimal::new(-7, i32::MAX),
        Decimal::new(-7, i32::MAX - 1),
    ];

    assert_order_preserved(&values[1], &values[0], Ordering::Less);
    assert_order_preserved(&values[2], &values[3], Ordering::Greater);
    for value in &values {
        assert_round_trip(value);
    }
}

#[test]
fn decimal_exponent_without_a_scale_is_rejected() {
    // positive bucket, exponent i64::MIN, digit '1'
    let mut bytes = vec![0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    bytes.extend([b'1', 0x00]);

    let err = decode_exact::<Decimal>(&bytes, Direction::Asc).unwrap_err();
    assert!(matches!(err, KeyDecodeError::NonCanonical { .. }));
}

#[test]
fn encoded_key_wraps_raw_bytes() {
    let key = EncodedKey::from(vec![0x01, 0xFF]);

    assert_eq!(key.as_bytes(), &[0x01, 0xFF]);
    assert_eq!(key.len(), 2);
    assert!(key < EncodedKey::from(vec![0x02]));
}

#[test]
fn trailing_bytes_and_bad_offsets_are_rejected() {
    let mut bytes = encode(&7u16, Direction::Asc).into_vec();
    bytes.push(0x00);
    assert_eq!(
        decode_exact::<u16>(&bytes, Direction::Asc).unwrap_err(),
        KeyDecodeError::TrailingBytes { remaining: 1 }
    );

    assert!(matches!(
        KeyReader::new(&bytes, 9, Direction::Asc),
        Err(KeyDecodeError::OffsetOutOfRange { offset: 9, len: 3 })
    ));
}

// ---------------------------------------------------------------------
// Dynamic values
// ---------------------------------------------------------------------

#[test]
fn dynamic_values_match_typed_encoding() {
    assert_eq!(
        encode_dynamic(&Value::Int32(9), ScalarKind::Int32, false),
        encode(&9i32, Direction::Asc).into_vec()
    );
    assert_eq!(
        encode_dynamic(&Value::Null, ScalarKind::Text, true),
        encode(&None::<String>, Direction::Asc).into_vec()
    );
    assert_eq!(
        encode_dynamic(&Value::from("x"), ScalarKind::Text, true),
        encode(&Some("x".to_string()), Direction::Asc).into_vec()
    );
}

#[test]
fn dynamic_values_reject_kind_mismatch_and_null() {
    let mut out = Vec::new();
    let mut writer = KeyWriter::new(&mut out, Direction::Asc);

    assert_eq!(
        encode_value(&Value::Int64(1), ScalarKind::Int32, false, &mut writer),
        Err(KeyEncodeError::KindMismatch {
            expected: ScalarKind::Int32.label(),
            found: ScalarKind::Int64.label(),
        })
    );
    assert!(matches!(
        encode_value(&Value::Null, ScalarKind::Bool, false, &mut writer),
        Err(KeyEncodeError::NullNotAllowed { .. })
    ));
    assert!(out.is_empty());
}

#[test]
fn dynamic_length_matches_fixed_width_metadata() {
    let samples = [
        Value::Bool(true),
        Value::Int8(1),
        Value::Int16(1),
        Value::Uint16(1),
        Value::Char('q'),
        Value::Int32(1),
        Value::Int64(1),
        Value::Float32(1.0),
        Value::Float64(1.0),
    ];

    for value in samples {
        let kind = value.kind().expect("sample values are non-null");
        assert_eq!(value_encoded_len(&value, kind, false), kind.fixed_width());
        assert_eq!(value_encoded_len(&value, kind, true), kind.nullable_fixed_width());
        assert_eq!(
            value_encoded_len(&Value::Null, kind, true),
            Some(1),
            "null width for {kind:?}"
        );
    }

    assert_eq!(value_encoded_len(&Value::Null, ScalarKind::Int32, false), None);
}

#[test]
fn null_decodes_for_every_nullable_kind() {
    for kind in ALL_SCALAR_KINDS {
        let bytes = encode_dynamic(&Value::Null, kind, true);
        let mut reader = KeyReader::new(&bytes, 0, Direction::Asc).expect("offset in range");

        let decoded = decode_value(kind, true, &mut reader).expect("null should decode");
        assert!(decoded.is_null(), "{kind:?}");
        assert_eq!(reader.remaining(), 0);
    }
}

// ---------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------

fn assert_order_preserved<T: KeyCodec>(lhs: &T, rhs: &T, natural: Ordering) {
    let asc = encode(lhs, Direction::Asc).cmp(&encode(rhs, Direction::Asc));
    let desc = encode(lhs, Direction::Desc).cmp(&encode(rhs, Direction::Desc));

    assert_eq!(asc, natural);
    assert_eq!(desc, natural.reverse());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn integers_round_trip_and_preserve_order(a in any::<i64>(), b in any::<i64>()) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn narrow_integers_preserve_order(
        a in any::<i16>(),
        b in any::<i16>(),
        c in any::<u16>(),
        d in any::<u16>(),
    ) {
        assert_round_trip(&a);
        assert_round_trip(&c);
        assert_order_preserved(&a, &b, a.cmp(&b));
        assert_order_preserved(&c, &d, c.cmp(&d));
    }

    #[test]
    fn chars_preserve_order(a in any::<char>(), b in any::<char>()) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn floats_follow_total_order(a in any::<f64>(), b in any::<f64>()) {
        let natural = Value::Float64(a).cmp(&Value::Float64(b));
        assert_order_preserved(&a, &b, natural);

        let (decoded, _) = decode::<f64>(&encode(&a, Direction::Asc), 0, Direction::Asc).unwrap();
        prop_assert_eq!(Value::Float64(decoded), Value::Float64(a));
    }

    #[test]
    fn f32_follow_total_order(a in any::<f32>(), b in any::<f32>()) {
        let natural = Value::Float32(a).cmp(&Value::Float32(b));
        assert_order_preserved(&a, &b, natural);
    }

    #[test]
    fn big_integers_round_trip_and_preserve_order(
        a in big_int_strategy(),
        b in big_int_strategy(),
    ) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn decimals_round_trip_and_preserve_order(a in decimal_strategy(), b in decimal_strategy()) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn strings_round_trip_and_preserve_order(a in any::<String>(), b in any::<String>()) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn blobs_round_trip_and_preserve_order(
        a in proptest::collection::vec(prop_oneof![Just(0u8), Just(0xFFu8), any::<u8>()], 0..16),
        b in proptest::collection::vec(prop_oneof![Just(0u8), Just(0xFFu8), any::<u8>()], 0..16),
    ) {
        assert_round_trip(&a);
        assert_order_preserved(&a, &b, a.cmp(&b));
    }

    #[test]
    fn null_sorts_first_ascending_and_last_descending(
        s in any::<String>(),
        n in any::<i32>(),
        d in decimal_strategy(),
    ) {
        assert_order_preserved(&None::<String>, &Some(s), Ordering::Less);
        assert_order_preserved(&None::<i32>, &Some(n), Ordering::Less);
        assert_order_preserved(&None::<Decimal>, &Some(d), Ordering::Less);
    }

    #[test]
    fn nullable_values_round_trip(
        v in proptest::option::of(any::<String>()),
        w in proptest::option::of(any::<bool>()),
    ) {
        assert_round_trip(&v);
        assert_round_trip(&w);
    }

    #[test]
    fn concatenated_components_decode_in_sequence(
        a in any::<String>(),
        b in decimal_strategy(),
        c in any::<i32>(),
    ) {
        let mut out = Vec::new();
        encode_into(&a, Direction::Asc, &mut out);
        encode_into(&b, Direction::Desc, &mut out);
        encode_into(&c, Direction::Asc, &mut out);

        let (da, na) = decode::<String>(&out, 0, Direction::Asc).unwrap();
        let (db, nb) = decode::<Decimal>(&out, na, Direction::Desc).unwrap();
        let (dc, nc) = decode::<i32>(&out, na + nb, Direction::Asc).unwrap();

        prop_assert_eq!(da, a);
        prop_assert_eq!(db, b);
        prop_assert_eq!(dc, c);
        prop_assert_eq!(na + nb + nc, out.len());
    }
}
