//! Variable-length strings and byte blobs.
//!
//! Strings are packed per code point into one to three bytes and end with
//! a `0x01` terminator, which leaves `0x00` free for null. Blobs escape
//! embedded zeros as `00 FF` and end with `00 00`.

use crate::codec::{
    Direction, EncodedKey, KeyCodec, KeyDecodeError, KeyReader, KeyWriter, NULL_MARKER,
};

const STRING_TERMINATOR: u8 = 0x01;

// Code points below this pack into one byte as `c + 2`.
const ONE_BYTE_LIMIT: u32 = 0x7E;
// Code points below this pack into two bytes.
const TWO_BYTE_LIMIT: u32 = 0x3F7E;

const TWO_BYTE_BASE: u8 = 0x80;
const TWO_BYTE_LAST: u8 = 0xBE;
const THREE_BYTE_BASE: u8 = 0xC0;
const THREE_BYTE_LAST: u8 = 0xD0;

const BLOB_ESCAPE: u8 = 0x00;
const BLOB_ESCAPED_ZERO: u8 = 0xFF;
const BLOB_TERMINATOR: u8 = 0x00;

const fn code_point_len(c: char) -> usize {
    let c = c as u32;
    if c < ONE_BYTE_LIMIT {
        1
    } else if c < TWO_BYTE_LIMIT {
        2
    } else {
        3
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_code_point(c: char, writer: &mut KeyWriter<'_>) {
    let c = u32::from(c);
    if c < ONE_BYTE_LIMIT {
        writer.push((c + 2) as u8);
    } else if c < TWO_BYTE_LIMIT {
        let d = c - ONE_BYTE_LIMIT;
        writer.push(TWO_BYTE_BASE + (d >> 8) as u8);
        writer.push((d & 0xFF) as u8);
    } else {
        let d = c - TWO_BYTE_LIMIT;
        writer.push(THREE_BYTE_BASE + (d >> 16) as u8);
        writer.push(((d >> 8) & 0xFF) as u8);
        writer.push((d & 0xFF) as u8);
    }
}

fn write_str(value: &str, writer: &mut KeyWriter<'_>) {
    for c in value.chars() {
        write_code_point(c, writer);
    }
    writer.push(STRING_TERMINATOR);
}

/// Encode a borrowed string without allocating an owned `String` first.
#[must_use]
pub fn encode_str(value: &str, direction: Direction) -> EncodedKey {
    let mut out = Vec::with_capacity(encoded_str_len(value));
    write_str(value, &mut KeyWriter::new(&mut out, direction));

    EncodedKey::new(out)
}

/// Exact non-null encoded length of `value`, terminator included.
#[must_use]
pub fn encoded_str_len(value: &str) -> usize {
    value.chars().map(code_point_len).sum::<usize>() + 1
}

impl KeyCodec for String {
    fn encoded_len(&self) -> usize {
        encoded_str_len(self)
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        write_str(self, writer);
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let mut out = Self::new();

        loop {
            let start = reader.offset();
            let lead = reader.read_u8("string")?;
            let scalar = match lead {
                STRING_TERMINATOR => return Ok(out),
                0x02..=0x7F => u32::from(lead) - 2,
                TWO_BYTE_BASE..=TWO_BYTE_LAST => {
                    let lo = reader.read_u8("string")?;
                    let d = (u32::from(lead - TWO_BYTE_BASE) << 8) | u32::from(lo);
                    let c = d + ONE_BYTE_LIMIT;
                    if c >= TWO_BYTE_LIMIT {
                        return Err(reader.non_canonical("string"));
                    }
                    c
                }
                THREE_BYTE_BASE..=THREE_BYTE_LAST => {
                    let [mid, lo] = reader.read_array::<2>("string")?;
                    let d = (u32::from(lead - THREE_BYTE_BASE) << 16)
                        | (u32::from(mid) << 8)
                        | u32::from(lo);
                    d + TWO_BYTE_LIMIT
                }
                other => return Err(reader.invalid_marker("string", other)),
            };

            let c = char::from_u32(scalar).ok_or(KeyDecodeError::InvalidCodePoint {
                value: scalar,
                offset: start,
            })?;
            out.push(c);
        }
    }

    fn nullable_encoded_len(value: Option<&Self>) -> usize {
        value.map_or(1, Self::encoded_len)
    }

    fn write_nullable(value: Option<&Self>, writer: &mut KeyWriter<'_>) {
        match value {
            None => writer.push(NULL_MARKER),
            Some(value) => value.write_key(writer),
        }
    }

    fn read_nullable(reader: &mut KeyReader<'_>) -> Result<Option<Self>, KeyDecodeError> {
        if reader.peek_u8("null marker")? == NULL_MARKER {
            reader.read_u8("null marker")?;
            return Ok(None);
        }

        Self::read_key(reader).map(Some)
    }
}

impl KeyCodec for Vec<u8> {
    fn encoded_len(&self) -> usize {
        let zeros = self.iter().filter(|byte| **byte == 0).count();

        self.len() + zeros + 2
    }

    fn write_key(&self, writer: &mut KeyWriter<'_>) {
        for &byte in self {
            writer.push(byte);
            if byte == BLOB_ESCAPE {
                writer.push(BLOB_ESCAPED_ZERO);
            }
        }
        writer.push(BLOB_ESCAPE);
        writer.push(BLOB_TERMINATOR);
    }

    fn read_key(reader: &mut KeyReader<'_>) -> Result<Self, KeyDecodeError> {
        let mut out = Self::new();

        loop {
            let byte = reader.read_u8("blob")?;
            if byte != BLOB_ESCAPE {
                out.push(byte);
                continue;
            }

            let offset = reader.offset();
            match reader.read_u8("blob escape")? {
                BLOB_TERMINATOR => return Ok(out),
                BLOB_ESCAPED_ZERO => out.push(0),
                other => return Err(KeyDecodeError::InvalidEscape { byte: other, offset }),
            }
        }
    }
}
