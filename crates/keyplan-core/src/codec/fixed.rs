//! Fixed-width scalars: booleans, integers, chars, and IEEE floats.
//!
//! Signed integers flip the sign bit so twos-complement order becomes
//! unsigned big-endian order. Floats flip the sign bit of positives and all
//! bits of negatives.

use crate::{
    codec::{KeyCodec, KeyDecodeError, KeyReader, KeyWriter},
    value::{canonical_f32, canonical_f64},
};

const BOOL_FALSE: u8 = 0x00;
const BOOL_TRUE: u8 = 0x01;

// Nullable booleans keep one byte: null < false < true.
const NULLABLE_BOOL_NULL: u8 = 0x00;
const NULLABLE_BOOL_FALSE: u8 = 0x01;
const NULLABLE_BOOL_TRUE: u8 = 0x02;

const CHAR_WIDTH: usize = 3;

impl KeyCodec for bool {
    fn encoded_len(&self) -> usize {
        1
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        writer.push(if *self { BOOL_TRUE } else { BOOL_FALSE });
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        match reader.read_u8("bool")? {
            BOOL_FALSE => Ok(false),
            BOOL_TRUE => Ok(true),
            other => Err(reader.invalid_marker("bool", other)),
        }
    }

    fn nullable_encoded_len(_: Option<&Self>) -> usize {
        1
    }

    fn write_nullable(value: Option<&Self>, writer: &mut KeyWriter<'_>) {
        writer.push(match value {
            None => NULLABLE_BOOL_NULL,
            Some(false) => NULLABLE_BOOL_FALSE,
            Some(true) => NULLABLE_BOOL_TRUE,
        });
    }

    fn read_nullable(reader: &mut KeyReader<'_>) -> Result<Option<Self>, KeyDecodeError> {
        match reader.read_u8("nullable bool")? {
            NULLABLE_BOOL_NULL => Ok(None),
            NULLABLE_BOOL_FALSE => Ok(Some(false)),
            NULLABLE_BOOL_TRUE => Ok(Some(true)),
            other => Err(reader.invalid_marker("nullable bool", other)),
        }
    }
}

macro_rules! impl_signed_codec {
    ( $( $ty:ty => $uty:ty, $width:literal );* $(;)? ) => {
        $(
            impl KeyCodec for $ty {
                fn encoded_len(&self) -> usize {
                    $width
                }

                fn write_key(&self, writer: &mut KeyWriter<'_>) {
                    let sign: $uty = 1 << (<$uty>::BITS - 1);
                    writer.extend(&(self.cast_unsigned() ^ sign).to_be_bytes());
                }

                fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
                    let sign: $uty = 1 << (<$uty>::BITS - 1);
                    let bytes = reader.read_array::<$width>(stringify!($ty))?;

                    Ok((<$uty>::from_be_bytes(bytes) ^ sign).cast_signed())
                }
            }
        )*
    };
}

impl_signed_codec! {
    i8 => u8, 1;
    i16 => u16, 2;
    i32 => u32, 4;
    i64 => u64, 8;
}

impl KeyCodec for u16 {
    fn encoded_len(&self) -> usize {
        2
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        writer.extend(&self.to_be_bytes());
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        Ok(Self::from_be_bytes(reader.read_array::<2>("u16")?))
    }
}

impl KeyCodec for char {
    fn encoded_len(&self) -> usize {
        CHAR_WIDTH
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        let bytes = u32::from(*self).to_be_bytes();
        writer.extend(&bytes[1..]);
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let offset = reader.offset();
        let [hi, mid, lo] = reader.read_array::<CHAR_WIDTH>("char")?;
        let scalar = u32::from_be_bytes([0, hi, mid, lo]);

        Self::from_u32(scalar).ok_or(KeyDecodeError::InvalidCodePoint {
            value: scalar,
            offset,
        })
    }
}

const F32_SIGN: u32 = 0x8000_0000;
const F64_SIGN: u64 = 0x8000_0000_0000_0000;

impl KeyCodec for f32 {
    fn encoded_len(&self) -> usize {
        4
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        let bits = canonical_f32(*self).to_bits();
        let ordered = if bits & F32_SIGN == 0 {
            bits ^ F32_SIGN
        } else {
            !bits
        };
        writer.extend(&ordered.to_be_bytes());
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let ordered = u32::from_be_bytes(reader.read_array::<4>("f32")?);
        let bits = if ordered & F32_SIGN == 0 {
            !ordered
        } else {
            ordered ^ F32_SIGN
        };

        Ok(Self::from_bits(bits))
    }
}

impl KeyCodec for f64 {
    fn encoded_len(&self) -> usize {
        8
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        let bits = canonical_f64(*self).to_bits();
        let ordered = if bits & F64_SIGN == 0 {
            bits ^ F64_SIGN
        } else {
            !bits
        };
        writer.extend(&ordered.to_be_bytes());
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let ordered = u64::from_be_bytes(reader.read_array::<8>("f64")?);
        let bits = if ordered & F64_SIGN == 0 {
            !ordered
        } else {
            ordered ^ F64_SIGN
        };

        Ok(Self::from_bits(bits))
    }
}
