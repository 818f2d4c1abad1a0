use crate::{
    codec::{KeyCodec, KeyDecodeError, KeyEncodeError, KeyReader, KeyWriter},
    types::Decimal,
    value::Value,
};
use keyplan_primitives::ScalarKind;
use num_bigint::BigInt;

// Dispatch one dynamic value onto the typed codec for its declared kind.
macro_rules! dispatch_encode {
    ( $value:expr, $kind:expr, $nullable:expr, $writer:expr;
      $( $variant:ident => $ty:ty ),* $(,)? ) => {
        match ($kind, $value) {
            $(
                (ScalarKind::$variant, Value::$variant(v)) => {
                    if $nullable {
                        <$ty as KeyCodec>::write_nullable(Some(v), $writer);
                    } else {
                        v.write_key($writer);
                    }
                    Ok(())
                }
                (ScalarKind::$variant, Value::Null) => {
                    <$ty as KeyCodec>::write_nullable(None, $writer);
                    Ok(())
                }
            )*
            (kind, other) => Err(match other.kind() {
                Some(found) => KeyEncodeError::kind_mismatch(kind, found),
                None => KeyEncodeError::NullNotAllowed {
                    expected: kind.label(),
                },
            }),
        }
    };
}

macro_rules! dispatch_decode {
    ( $kind:expr, $nullable:expr, $reader:expr; $( $variant:ident => $ty:ty ),* $(,)? ) => {
        match $kind {
            $(
                ScalarKind::$variant => {
                    if $nullable {
                        Ok(<$ty as KeyCodec>::read_nullable($reader)?
                            .map_or(Value::Null, Value::$variant))
                    } else {
                        <$ty as KeyCodec>::read_key($reader).map(Value::$variant)
                    }
                }
            )*
        }
    };
}

macro_rules! dispatch_len {
    ( $value:expr, $kind:expr, $nullable:expr; $( $variant:ident => $ty:ty ),* $(,)? ) => {
        match ($kind, $value) {
            $(
                (ScalarKind::$variant, Value::$variant(v)) => Some(if $nullable {
                    <$ty as KeyCodec>::nullable_encoded_len(Some(v))
                } else {
                    v.encoded_len()
                }),
                (ScalarKind::$variant, Value::Null) if $nullable => {
                    Some(<$ty as KeyCodec>::nullable_encoded_len(None))
                }
            )*
            _ => None,
        }
    };
}

/// Encode a dynamic value under the declared `(kind, nullable)` pair.
///
/// A null for a non-nullable kind and a value of a different kind are both
/// rejected; nothing is written in either case.
pub fn encode_value(
    value: &Value,
    kind: ScalarKind,
    nullable: bool,
    writer: &mut KeyWriter<'_>,
) -> Result<(), KeyEncodeError> {
    if value.is_null() && !nullable {
        return Err(KeyEncodeError::NullNotAllowed {
            expected: kind.label(),
        });
    }

    dispatch_encode! { value, kind, nullable, writer;
        Bool => bool,
        Int8 => i8,
        Int16 => i16,
        Uint16 => u16,
        Char => char,
        Int32 => i32,
        Int64 => i64,
        Float32 => f32,
        Float64 => f64,
        IntBig => BigInt,
        Decimal => Decimal,
        Text => String,
        Blob => Vec<u8>,
    }
}

/// Decode one dynamic value of the declared `(kind, nullable)` pair.
pub fn decode_value(
    kind: ScalarKind,
    nullable: bool,
    reader: &mut KeyReader<'_>,
) -> Result<Value, KeyDecodeError> {
    dispatch_decode! { kind, nullable, reader;
        Bool => bool,
        Int8 => i8,
        Int16 => i16,
        Uint16 => u16,
        Char => char,
        Int32 => i32,
        Int64 => i64,
        Float32 => f32,
        Float64 => f64,
        IntBig => BigInt,
        Decimal => Decimal,
        Text => String,
        Blob => Vec<u8>,
    }
}

/// Encoded length of a dynamic value, or `None` when it could not be
/// encoded under the declared pair.
#[must_use]
pub fn value_encoded_len(value: &Value, kind: ScalarKind, nullable: bool) -> Option<usize> {
    dispatch_len! { value, kind, nullable;
        Bool => bool,
        Int8 => i8,
        Int16 => i16,
        Uint16 => u16,
        Char => char,
        Int32 => i32,
        Int64 => i64,
        Float32 => f32,
        Float64 => f64,
        IntBig => BigInt,
        Decimal => Decimal,
        Text => String,
        Blob => Vec<u8>,
    }
}
