use crate::{
    codec::{Direction, EncodedKey, KeyWriter, encode_value},
    error::InternalError,
    model::schema::{RecordSchema, SchemaError},
    store::Record,
    value::Value,
};
use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

///
/// IndexProperty
///
/// One position of an index: the property and its stored direction.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IndexProperty {
    pub property: String,
    pub direction: Direction,
}

impl IndexProperty {
    #[must_use]
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    #[must_use]
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    #[must_use]
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }
}

///
/// IndexSpec
///
/// Runtime descriptor for one index declared on a record type.
///
/// Equality and hashing are structural over properties and flags; two
/// same-shaped indexes are equal whatever their names. Callers that need a
/// particular declared index match on `name`. `ordinal` is the declaration
/// position inside the owning schema and only breaks final ties between
/// otherwise equal plans.
///

#[derive(Clone, Debug)]
pub struct IndexSpec {
    pub name: String,
    pub properties: Vec<IndexProperty>,
    pub unique: bool,
    pub clustered: bool,
    pub ordinal: usize,
}

impl IndexSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, properties: Vec<IndexProperty>) -> Self {
        Self {
            name: name.into(),
            properties,
            unique: false,
            clustered: false,
            ordinal: 0,
        }
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn clustered(mut self) -> Self {
        self.clustered = true;
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    #[must_use]
    pub fn property(&self, position: usize) -> Option<&IndexProperty> {
        self.properties.get(position)
    }

    #[must_use]
    pub fn position_of(&self, property: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|entry| entry.property == property)
    }

    /// Append the encoding of successive components, starting at index
    /// position `start`, to `out`.
    pub fn encode_components_into(
        &self,
        schema: &RecordSchema,
        start: usize,
        values: &[Value],
        out: &mut Vec<u8>,
    ) -> Result<(), InternalError> {
        for (offset, value) in values.iter().enumerate() {
            let position = start + offset;
            let entry = self.property(position).ok_or_else(|| {
                InternalError::planner_invariant(format!(
                    "index '{}' has no position {position}",
                    self.name
                ))
            })?;
            let model = schema.require_property(&entry.property)?;

            encode_value(
                value,
                model.kind,
                model.nullable,
                &mut KeyWriter::new(out, entry.direction),
            )?;
        }

        Ok(())
    }

    /// Encode a leading run of component values into one key prefix.
    pub fn encode_prefix(
        &self,
        schema: &RecordSchema,
        values: &[Value],
    ) -> Result<EncodedKey, InternalError> {
        let mut out = Vec::new();
        self.encode_components_into(schema, 0, values, &mut out)?;

        Ok(EncodedKey::new(out))
    }

    /// Build the full entry key a backend stores for `record`.
    ///
    /// Missing accessor values encode as null and are rejected for
    /// non-nullable properties.
    pub fn encode_entry_key<R: Record + ?Sized>(
        &self,
        schema: &RecordSchema,
        record: &R,
    ) -> Result<EncodedKey, InternalError> {
        let values: Vec<Value> = self
            .properties
            .iter()
            .map(|entry| record.value(&entry.property).unwrap_or(Value::Null))
            .collect();

        self.encode_prefix(schema, &values)
    }

    /// Check this index against the declared properties of `schema`.
    pub(crate) fn validate(&self, schema: &RecordSchema) -> Result<(), SchemaError> {
        if self.properties.is_empty() || self.properties.len() > crate::MAX_INDEX_PROPERTIES {
            return Err(SchemaError::IndexArity {
                index: self.name.clone(),
                len: self.properties.len(),
                max: crate::MAX_INDEX_PROPERTIES,
            });
        }

        for (position, entry) in self.properties.iter().enumerate() {
            if schema.property(&entry.property).is_none() {
                return Err(SchemaError::IndexPropertyMissing {
                    index: self.name.clone(),
                    property: entry.property.clone(),
                });
            }
            if crate::model::property::is_chained_path(&entry.property) {
                return Err(SchemaError::ChainedIndexProperty {
                    index: self.name.clone(),
                    property: entry.property.clone(),
                });
            }
            if self.properties[..position]
                .iter()
                .any(|earlier| earlier.property == entry.property)
            {
                return Err(SchemaError::DuplicateProperty {
                    context: format!("index '{}'", self.name),
                    property: entry.property.clone(),
                });
            }
        }

        Ok(())
    }
}

impl PartialEq for IndexSpec {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.unique == other.unique
            && self.clustered == other.clustered
    }
}

impl Eq for IndexSpec {}

impl Hash for IndexSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.properties.hash(state);
        self.unique.hash(state);
        self.clustered.hash(state);
    }
}

impl Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: Vec<String> = self
            .properties
            .iter()
            .map(|entry| format!("{}{}", entry.direction.sign(), entry.property))
            .collect();

        write!(f, "{}({})", self.name, properties.join(", "))?;
        if self.unique {
            write!(f, " UNIQUE")?;
        }
        if self.clustered {
            write!(f, " CLUSTERED")?;
        }

        Ok(())
    }
}
