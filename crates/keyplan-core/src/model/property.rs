use crate::model::schema::SchemaError;
use std::fmt::{self, Display};

/// Separator between the segments of a chained property path.
pub const CHAIN_SEPARATOR: char = '.';

///
/// ChainedProperty
///
/// A property path such as `address.city`. The first segment is the prime
/// property of the record itself; later segments walk into joined records.
/// Plain properties are chains of length one.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ChainedProperty {
    segments: Vec<String>,
}

impl ChainedProperty {
    /// Split a dotted path into segments. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, SchemaError> {
        let segments: Vec<String> = path.split(CHAIN_SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SchemaError::UnknownProperty {
                property: path.to_string(),
            });
        }

        Ok(Self { segments })
    }

    /// The first segment, owned by the record itself.
    #[must_use]
    pub fn prime(&self) -> &str {
        &self.segments[0]
    }

    /// Number of joins after the prime property.
    #[must_use]
    pub const fn chain_count(&self) -> usize {
        self.segments.len() - 1
    }

    #[must_use]
    pub const fn is_chained(&self) -> bool {
        self.segments.len() > 1
    }

    /// Segment at chain position `index`, where 0 is the first joined
    /// segment after the prime property.
    pub fn get_chained_property(&self, index: usize) -> Result<&str, SchemaError> {
        self.segments
            .get(index + 1)
            .map(String::as_str)
            .ok_or_else(|| SchemaError::ChainedPropertyOutOfRange {
                path: self.to_string(),
                index,
                chain_count: self.chain_count(),
            })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for ChainedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Whether `name` is a chained path rather than a plain property.
#[must_use]
pub fn is_chained_path(name: &str) -> bool {
    name.contains(CHAIN_SEPARATOR)
}
