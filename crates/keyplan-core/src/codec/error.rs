use keyplan_primitives::ScalarKind;
use thiserror::Error as ThisError;

///
/// KeyDecodeError
///
/// Bytes that do not follow the key grammar of the expected type.
/// Markers are reported in their ascending (uncomplemented) form.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyDecodeError {
    #[error("decode offset {offset} is past the end of a {len}-byte key")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("truncated key: {context} needs {needed} byte(s) at offset {offset}")]
    Truncated {
        context: &'static str,
        needed: usize,
        offset: usize,
    },

    #[error("invalid {context} marker {marker:#04x} at offset {offset}")]
    InvalidMarker {
        context: &'static str,
        marker: u8,
        offset: usize,
    },

    #[error("invalid escape byte {byte:#04x} at offset {offset}")]
    InvalidEscape { byte: u8, offset: usize },

    #[error("decoded value {value:#x} at offset {offset} is not a unicode scalar value")]
    InvalidCodePoint { value: u32, offset: usize },

    #[error("non-canonical {context} encoding at offset {offset}")]
    NonCanonical {
        context: &'static str,
        offset: usize,
    },

    #[error("{remaining} trailing byte(s) after decoded key")]
    TrailingBytes { remaining: usize },
}

///
/// KeyEncodeError
///
/// A dynamic value cannot be encoded under the declared property type.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyEncodeError {
    #[error("value of kind '{found}' cannot be encoded as '{expected}'")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("null value for non-nullable '{expected}' key component")]
    NullNotAllowed { expected: &'static str },
}

impl KeyEncodeError {
    pub(crate) const fn kind_mismatch(expected: ScalarKind, found: ScalarKind) -> Self {
        Self::KindMismatch {
            expected: expected.label(),
            found: found.label(),
        }
    }
}
