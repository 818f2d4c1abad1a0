mod compare;

#[cfg(test)]
mod tests;

use crate::types::Decimal;
use keyplan_primitives::ScalarKind;
use num_bigint::BigInt;
use std::{cmp::Ordering, fmt};

pub(crate) use compare::{canonical_f32, canonical_f64};

///
/// Value
///
/// Dynamic scalar value carried by filter literals, record accessors, and
/// the key codec. `Null` is below every other value; within one kind the
/// order is the natural order of that kind.
///

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Uint16(u16),
    Char(char),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    IntBig(BigInt),
    Decimal(Decimal),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Scalar kind of this value, or `None` for `Null`.
    #[must_use]
    pub const fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int8(_) => ScalarKind::Int8,
            Self::Int16(_) => ScalarKind::Int16,
            Self::Uint16(_) => ScalarKind::Uint16,
            Self::Char(_) => ScalarKind::Char,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Float32(_) => ScalarKind::Float32,
            Self::Float64(_) => ScalarKind::Float64,
            Self::IntBig(_) => ScalarKind::IntBig,
            Self::Decimal(_) => ScalarKind::Decimal,
            Self::Text(_) => ScalarKind::Text,
            Self::Blob(_) => ScalarKind::Blob,
        })
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Return whether this value may be stored in a property of `kind`.
    #[must_use]
    pub fn matches_kind(&self, kind: ScalarKind, nullable: bool) -> bool {
        match self.kind() {
            None => nullable,
            Some(own) => own == kind,
        }
    }

    /// Natural comparison between two values.
    ///
    /// Values of different kinds order by kind declaration order; validated
    /// filters never compare across kinds, so this only keeps sorting total.
    #[must_use]
    pub fn cmp_natural(&self, other: &Self) -> Ordering {
        compare::cmp_values(self, other)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_natural(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_natural(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "'{v}'"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::IntBig(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Blob(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! impl_value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    u16 => Uint16,
    char => Char,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    BigInt => IntBig,
    Decimal => Decimal,
    String => Text,
    Vec<u8> => Blob,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
