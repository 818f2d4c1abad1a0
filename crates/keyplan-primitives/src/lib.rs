//! Shared scalar vocabulary for keyplan schemas, codecs, and planners.

///
/// ScalarKind
///
/// Canonical scalar kind of one record property.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Uint16,
    Char,
    Int32,
    Int64,
    Float32,
    Float64,
    IntBig,
    Decimal,
    Text,
    Blob,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        match self {
            Self::Bool => ScalarMetadata::fixed("bool", 1, 1),
            Self::Int8 => ScalarMetadata::fixed("int8", 1, 2),
            Self::Int16 => ScalarMetadata::fixed("int16", 2, 3),
            Self::Uint16 => ScalarMetadata::fixed("uint16", 2, 3),
            Self::Char => ScalarMetadata::fixed("char", 3, 4),
            Self::Int32 => ScalarMetadata::fixed("int32", 4, 5),
            Self::Int64 => ScalarMetadata::fixed("int64", 8, 9),
            Self::Float32 => ScalarMetadata::fixed("float32", 4, 5),
            Self::Float64 => ScalarMetadata::fixed("float64", 8, 9),
            Self::IntBig => ScalarMetadata::variable("int_big"),
            Self::Decimal => ScalarMetadata::variable("decimal"),
            Self::Text => ScalarMetadata::variable("text"),
            Self::Blob => ScalarMetadata::variable("blob"),
        }
    }

    /// Stable lowercase label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.metadata().label
    }

    /// Encoded key width for non-null values, if fixed.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        self.metadata().fixed_width
    }

    /// Encoded key width for the nullable form, if fixed.
    #[must_use]
    pub const fn nullable_fixed_width(self) -> Option<usize> {
        self.metadata().nullable_fixed_width
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared by the schema and codec layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalarMetadata {
    pub label: &'static str,
    pub fixed_width: Option<usize>,
    pub nullable_fixed_width: Option<usize>,
}

impl ScalarMetadata {
    const fn fixed(label: &'static str, width: usize, nullable_width: usize) -> Self {
        Self {
            label,
            fixed_width: Some(width),
            nullable_fixed_width: Some(nullable_width),
        }
    }

    const fn variable(label: &'static str) -> Self {
        Self {
            label,
            fixed_width: None,
            nullable_fixed_width: None,
        }
    }
}

/// Ordered list of all scalar kinds in declaration order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 13] = [
    ScalarKind::Bool,
    ScalarKind::Int8,
    ScalarKind::Int16,
    ScalarKind::Uint16,
    ScalarKind::Char,
    ScalarKind::Int32,
    ScalarKind::Int64,
    ScalarKind::Float32,
    ScalarKind::Float64,
    ScalarKind::IntBig,
    ScalarKind::Decimal,
    ScalarKind::Text,
    ScalarKind::Blob,
];

///
/// TESTS
///
