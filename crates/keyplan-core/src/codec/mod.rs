//! Module: codec
//! Responsibility: order-preserving key encodings for every supported scalar.
//! Does not own: composite index layout or range-bound policy.
//! Boundary: storage backends compare the bytes produced here with plain
//! unsigned lexicographic comparison, so every encoding must be prefix-free
//! and order-preserving.
//!
//! Descending keys are the bitwise complement of the ascending bytes. The
//! writer and reader apply the complement, so per-type codecs only ever see
//! the ascending form.

mod error;
mod fixed;
mod number;
mod text;
mod value;

#[cfg(test)]
mod tests;

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

pub use error::{KeyDecodeError, KeyEncodeError};
pub use text::{encode_str, encoded_str_len};
pub use value::{decode_value, encode_value, value_encoded_len};

/// Null marker shared by every nullable encoding.
pub(crate) const NULL_MARKER: u8 = 0x00;

/// Presence marker for nullable encodings without a built-in null slot.
pub(crate) const PRESENT_MARKER: u8 = 0x01;

///
/// Direction
///
/// Key and traversal direction shared by the codec, the index model, and
/// ordering specifications.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }

    /// Reverse `ordering` when this direction is descending.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    /// Sign prefix used by compact renderings (`+name` / `-name`).
    #[must_use]
    pub const fn sign(self) -> char {
        match self {
            Self::Asc => '+',
            Self::Desc => '-',
        }
    }
}

///
/// EncodedKey
///
/// Immutable encoded key bytes. Ordering is plain byte-lexicographic order.
///

#[derive(Clone, Default, Deref, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct EncodedKey(Vec<u8>);

impl EncodedKey {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedKey(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

///
/// KeyWriter
///
/// Append-only sink that applies the direction complement.
///

pub struct KeyWriter<'a> {
    out: &'a mut Vec<u8>,
    direction: Direction,
}

impl<'a> KeyWriter<'a> {
    pub const fn new(out: &'a mut Vec<u8>, direction: Direction) -> Self {
        Self { out, direction }
    }

    pub fn push(&mut self, byte: u8) {
        self.out.push(match self.direction {
            Direction::Asc => byte,
            Direction::Desc => !byte,
        });
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        match self.direction {
            Direction::Asc => self.out.extend_from_slice(bytes),
            Direction::Desc => self.out.extend(bytes.iter().map(|byte| !byte)),
        }
    }

    /// Append the complement of `bytes` (before applying the direction).
    pub(crate) fn extend_inverted(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(!byte);
        }
    }
}

///
/// KeyReader
///
/// Cursor over encoded bytes that undoes the direction complement.
///

pub struct KeyReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    direction: Direction,
}

impl<'a> KeyReader<'a> {
    pub fn new(
        bytes: &'a [u8],
        offset: usize,
        direction: Direction,
    ) -> Result<Self, KeyDecodeError> {
        if offset > bytes.len() {
            return Err(KeyDecodeError::OffsetOutOfRange {
                offset,
                len: bytes.len(),
            });
        }

        Ok(Self {
            bytes,
            offset,
            direction,
        })
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    const fn undo(&self, byte: u8) -> u8 {
        match self.direction {
            Direction::Asc => byte,
            Direction::Desc => !byte,
        }
    }

    const fn require(&self, needed: usize, context: &'static str) -> Result<(), KeyDecodeError> {
        if self.remaining() < needed {
            return Err(KeyDecodeError::Truncated {
                context,
                needed,
                offset: self.offset,
            });
        }

        Ok(())
    }

    pub fn peek_u8(&self, context: &'static str) -> Result<u8, KeyDecodeError> {
        self.require(1, context)?;

        Ok(self.undo(self.bytes[self.offset]))
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, KeyDecodeError> {
        let byte = self.peek_u8(context)?;
        self.offset += 1;

        Ok(byte)
    }

    pub fn read_array<const N: usize>(
        &mut self,
        context: &'static str,
    ) -> Result<[u8; N], KeyDecodeError> {
        self.require(N, context)?;

        let mut out = [0u8; N];
        for (slot, byte) in out.iter_mut().zip(&self.bytes[self.offset..self.offset + N]) {
            *slot = self.undo(*byte);
        }
        self.offset += N;

        Ok(out)
    }

    pub fn read_vec(
        &mut self,
        len: usize,
        context: &'static str,
    ) -> Result<Vec<u8>, KeyDecodeError> {
        self.require(len, context)?;

        let out = self.bytes[self.offset..self.offset + len]
            .iter()
            .map(|byte| self.undo(*byte))
            .collect();
        self.offset += len;

        Ok(out)
    }

    pub(crate) const fn invalid_marker(&self, context: &'static str, marker: u8) -> KeyDecodeError {
        KeyDecodeError::InvalidMarker {
            context,
            marker,
            offset: self.offset.saturating_sub(1),
        }
    }

    pub(crate) const fn non_canonical(&self, context: &'static str) -> KeyDecodeError {
        KeyDecodeError::NonCanonical {
            context,
            offset: self.offset,
        }
    }
}

///
/// KeyCodec
///
/// Order-preserving encode/decode for one scalar type.
///
/// The nullable hooks default to a one-byte presence marker in front of the
/// non-null form. Types whose grammar already has a free low byte override
/// them so null costs a single byte and sorts first.
///

pub trait KeyCodec: Sized {
    /// Exact number of bytes `write_key` produces for this value.
    fn encoded_len(&self) -> usize;

    fn write_key(&self, writer: &mut KeyWriter<'_>);

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError>;

    fn nullable_encoded_len(value: Option<&Self>) -> usize {
        value.map_or(1, |value| 1 + value.encoded_len())
    }

    fn write_nullable(value: Option<&Self>, writer: &mut KeyWriter<'_>) {
        match value {
            None => writer.push(NULL_MARKER),
            Some(value) => {
                writer.push(PRESENT_MARKER);
                value.write_key(writer);
            }
        }
    }

    fn read_nullable(reader: &mut KeyReader<'_>) -> Result<Option<Self>, KeyDecodeError> {
        match reader.read_u8("null marker")? {
            NULL_MARKER => Ok(None),
            PRESENT_MARKER => Self::read_key(reader).map(Some),
            other => Err(reader.invalid_marker("null", other)),
        }
    }
}

impl<T: KeyCodec> KeyCodec for Option<T> {
    fn encoded_len(&self) -> usize {
        T::nullable_encoded_len(self.as_ref())
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        T::write_nullable(self.as_ref(), writer);
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        T::read_nullable(reader)
    }
}

/// Encode one value in the requested direction.
#[must_use]
pub fn encode<T: KeyCodec>(value: &T, direction: Direction) -> EncodedKey {
    let mut out = Vec::with_capacity(value.encoded_len());
    encode_into(value, direction, &mut out);

    EncodedKey(out)
}

/// Append the encoding of one value to `out`.
pub fn encode_into<T: KeyCodec>(value: &T, direction: Direction, out: &mut Vec<u8>) {
    value.write_key(&mut KeyWriter::new(out, direction));
}

/// Descending convenience form of [`encode`].
#[must_use]
pub fn encode_desc<T: KeyCodec>(value: &T) -> EncodedKey {
    encode(value, Direction::Desc)
}

/// Decode one value starting at `offset`; returns the value and the number
/// of bytes consumed.
pub fn decode<T: KeyCodec>(
    bytes: &[u8],
    offset: usize,
    direction: Direction,
) -> Result<(T, usize), KeyDecodeError> {
    let mut reader = KeyReader::new(bytes, offset, direction)?;
    let value = T::read_key(&mut reader)?;

    Ok((value, reader.offset() - offset))
}

/// Descending convenience form of [`decode`].
pub fn decode_desc<T: KeyCodec>(bytes: &[u8], offset: usize) -> Result<(T, usize), KeyDecodeError> {
    decode(bytes, offset, Direction::Desc)
}

/// Decode a buffer that must hold exactly one encoded value.
pub fn decode_exact<T: KeyCodec>(bytes: &[u8], direction: Direction) -> Result<T, KeyDecodeError> {
    let (value, consumed) = decode(bytes, 0, direction)?;
    if consumed != bytes.len() {
        return Err(KeyDecodeError::TrailingBytes {
            remaining: bytes.len() - consumed,
        });
    }

    Ok(value)
}

/// Predict the encoded size of `value` without encoding it.
#[must_use]
pub fn encoded_len<T: KeyCodec>(value: &T) -> usize {
    value.encoded_len()
}
