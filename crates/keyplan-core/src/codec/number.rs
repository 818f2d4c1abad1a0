//! Arbitrary-precision integers and decimals.
//!
//! Both share a sign bucket byte that also leaves `0x00` free for null:
//! negative < zero < positive. Negative payloads are stored inverted so a
//! larger magnitude sorts first.

use crate::{
    codec::{KeyCodec, KeyDecodeError, KeyReader, KeyWriter, NULL_MARKER},
    types::Decimal,
};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;

const NEGATIVE_MARKER: u8 = 0x01;
const ZERO_MARKER: u8 = 0x02;
const POSITIVE_MARKER: u8 = 0x03;

const BIGINT_LENGTH_BYTES: usize = 4;
const EXPONENT_BYTES: usize = 8;
const DECIMAL_POSITIVE_TERMINATOR: u8 = 0x00;
const DECIMAL_NEGATIVE_TERMINATOR: u8 = 0xFF;

const fn ordered_i64_bytes(value: i64) -> [u8; 8] {
    let biased = value.cast_unsigned() ^ (1u64 << 63);
    biased.to_be_bytes()
}

const fn i64_from_ordered_bytes(bytes: [u8; 8]) -> i64 {
    (u64::from_be_bytes(bytes) ^ (1u64 << 63)).cast_signed()
}

fn invert<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    for byte in &mut bytes {
        *byte = !*byte;
    }
    bytes
}

fn magnitude_len(value: &BigInt) -> usize {
    usize::try_from(value.bits().div_ceil(8)).unwrap_or(usize::MAX)
}

// Absent values reuse the free low byte of the sign bucket.
fn write_sign_bucketed_nullable<T: KeyCodec>(value: Option<&T>, writer: &mut KeyWriter<'_>) {
    match value {
        None => writer.push(NULL_MARKER),
        Some(value) => value.write_key(writer),
    }
}

fn read_sign_bucketed_nullable<T: KeyCodec>(
    reader: &mut KeyReader<'_>,
) -> Result<Option<T>, KeyDecodeError> {
    if reader.peek_u8("null marker")? == NULL_MARKER {
        reader.read_u8("null marker")?;
        return Ok(None);
    }

    T::read_key(reader).map(Some)
}

impl KeyCodec for BigInt {
    fn encoded_len(&self) -> usize {
        if self.is_zero() {
            1
        } else {
            1 + BIGINT_LENGTH_BYTES + magnitude_len(self)
        }
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        let (sign, magnitude) = self.to_bytes_be();
        if sign == Sign::NoSign {
            writer.push(ZERO_MARKER);
            return;
        }

        // Magnitudes past u32::MAX bytes are far beyond any storable record.
        #[allow(clippy::cast_possible_truncation)]
        let len = (magnitude.len() as u32).to_be_bytes();

        if sign == Sign::Minus {
            writer.push(NEGATIVE_MARKER);
            writer.extend_inverted(&len);
            writer.extend_inverted(&magnitude);
        } else {
            writer.push(POSITIVE_MARKER);
            writer.extend(&len);
            writer.extend(&magnitude);
        }
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let marker = reader.read_u8("big integer sign")?;
        let (sign, negative) = match marker {
            ZERO_MARKER => return Ok(Self::zero()),
            POSITIVE_MARKER => (Sign::Plus, false),
            NEGATIVE_MARKER => (Sign::Minus, true),
            other => return Err(reader.invalid_marker("big integer sign", other)),
        };

        let mut len_bytes = reader.read_array::<BIGINT_LENGTH_BYTES>("big integer length")?;
        if negative {
            len_bytes = invert(len_bytes);
        }
        let len = usize::try_from(u32::from_be_bytes(len_bytes))
            .map_err(|_| reader.non_canonical("big integer length"))?;
        if len == 0 {
            return Err(reader.non_canonical("big integer length"));
        }

        let mut magnitude = reader.read_vec(len, "big integer magnitude")?;
        if negative {
            for byte in &mut magnitude {
                *byte = !*byte;
            }
        }
        if magnitude[0] == 0 {
            return Err(reader.non_canonical("big integer magnitude"));
        }

        Ok(Self::from_bytes_be(sign, &magnitude))
    }

    fn nullable_encoded_len(value: Option<&Self>) -> usize {
        value.map_or(1, Self::encoded_len)
    }

    fn write_nullable(value: Option<&Self>, writer: &mut KeyWriter<'_>) {
        write_sign_bucketed_nullable(value, writer);
    }

    fn read_nullable(reader: &mut KeyReader<'_>) -> Result<Option<Self>, KeyDecodeError> {
        read_sign_bucketed_nullable(reader)
    }
}

impl KeyCodec for Decimal {
    fn encoded_len(&self) -> usize {
        let canonical = self.canonical();
        if canonical.sign == Sign::NoSign {
            1
        } else {
            1 + EXPONENT_BYTES + canonical.digits.len() + 1
        }
    }

    // Sign bucket, scientific exponent, significant digits, terminator.
    // Normalisation drops trailing zeros so equal values share one encoding.
    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        let canonical = self.canonical();
        let exponent = ordered_i64_bytes(canonical.exponent);

        match canonical.sign {
            Sign::NoSign => writer.push(ZERO_MARKER),
            Sign::Plus => {
                writer.push(POSITIVE_MARKER);
                writer.extend(&exponent);
                writer.extend(&canonical.digits);
                writer.push(DECIMAL_POSITIVE_TERMINATOR);
            }
            Sign::Minus => {
                writer.push(NEGATIVE_MARKER);
                writer.extend_inverted(&exponent);
                writer.extend_inverted(&canonical.digits);
                writer.push(DECIMAL_NEGATIVE_TERMINATOR);
            }
        }
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let marker = reader.read_u8("decimal sign")?;
        let negative = match marker {
            ZERO_MARKER => return Ok(Self::zero()),
            POSITIVE_MARKER => false,
            NEGATIVE_MARKER => true,
            other => return Err(reader.invalid_marker("decimal sign", other)),
        };

        let mut exponent_bytes = reader.read_array::<EXPONENT_BYTES>("decimal exponent")?;
        if negative {
            exponent_bytes = invert(exponent_bytes);
        }
        let exponent = i64_from_ordered_bytes(exponent_bytes);

        let terminator = if negative {
            DECIMAL_NEGATIVE_TERMINATOR
        } else {
            DECIMAL_POSITIVE_TERMINATOR
        };
        let mut digits = Vec::new();
        loop {
            let byte = reader.read_u8("decimal digits")?;
            if byte == terminator {
                break;
            }
            digits.push(if negative { !byte } else { byte });
        }

        Self::from_canonical(negative, &digits, exponent)
            .ok_or_else(|| reader.non_canonical("decimal digits"))
    }

    fn nullable_encoded_len(value: Option<&Self>) -> usize {
        value.map_or(1, Self::encoded_len)
    }

    fn write_nullable(value: Option<&Self>, writer: &mut KeyWriter<'_>) {
        write_sign_bucketed_nullable(value, writer);
    }

    fn read_nullable(reader: &mut KeyReader<'_>) -> Result<Option<Self>, KeyDecodeError> {
        read_sign_bucketed_nullable(reader)
    }
}
