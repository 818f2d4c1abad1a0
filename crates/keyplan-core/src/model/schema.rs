//! Module: model::schema
//! Responsibility: static description of one record type.
//! Does not own: record storage or value access (see `store::Record`).
//! Boundary: built once at registration time and validated before any
//! query is planned against it.

use crate::{
    model::{
        index::IndexSpec,
        ordering::OrderingSpec,
        property::{ChainedProperty, is_chained_path},
    },
    value::Value,
};
use keyplan_primitives::ScalarKind;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("unknown property '{property}'")]
    UnknownProperty { property: String },

    #[error("duplicate property '{property}' in {context}")]
    DuplicateProperty { context: String, property: String },

    #[error("derived property cycle: {}", path.join(" -> "))]
    DerivedCycle { path: Vec<String> },

    #[error("index '{index}' references undeclared property '{property}'")]
    IndexPropertyMissing { index: String, property: String },

    #[error("index '{index}' cannot include chained property '{property}'")]
    ChainedIndexProperty { index: String, property: String },

    #[error("index '{index}' has {len} properties; expected 1..={max}")]
    IndexArity {
        index: String,
        len: usize,
        max: usize,
    },

    #[error("record '{record}' declares an empty primary key")]
    EmptyPrimaryKey { record: String },

    #[error("chained property '{path}' has no segment {index} (chain count {chain_count})")]
    ChainedPropertyOutOfRange {
        path: String,
        index: usize,
        chain_count: usize,
    },
}

///
/// PropertyModel
///
/// Declared type of one property. `derived_from` lists the properties this
/// one is computed from; derived properties are readable and indexable but
/// the dependency graph must stay acyclic.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyModel {
    pub name: String,
    pub kind: ScalarKind,
    pub nullable: bool,
    pub derived_from: Vec<String>,
}

impl PropertyModel {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            derived_from: Vec::new(),
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn derived_from<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derived_from = sources.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn is_derived(&self) -> bool {
        !self.derived_from.is_empty()
    }

    /// Whether `value` may be stored in this property.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        value.matches_kind(self.kind, self.nullable)
    }
}

///
/// RecordSchema
///
/// Properties, primary key, and indexes of one record type.
/// Index ordinals are assigned from declaration order.
///

#[derive(Clone, Debug)]
pub struct RecordSchema {
    pub name: String,
    pub properties: Vec<PropertyModel>,
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexSpec>,
}

impl RecordSchema {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        properties: Vec<PropertyModel>,
        primary_key: Vec<String>,
        indexes: Vec<IndexSpec>,
    ) -> Self {
        let indexes = indexes
            .into_iter()
            .enumerate()
            .map(|(ordinal, mut index)| {
                index.ordinal = ordinal;
                index
            })
            .collect();

        Self {
            name: name.into(),
            properties,
            primary_key,
            indexes,
        }
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn require_property(&self, name: &str) -> Result<&PropertyModel, SchemaError> {
        self.property(name)
            .ok_or_else(|| SchemaError::UnknownProperty {
                property: name.to_string(),
            })
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indexes.iter().find(|index| index.name == name)
    }

    /// Ascending primary-key ordering, the total-order tiebreak.
    #[must_use]
    pub fn primary_key_ordering(&self) -> OrderingSpec {
        OrderingSpec::new().with_tiebreak(&self.primary_key)
    }

    /// Structural validation: unique names, resolvable references, bounded
    /// indexes, and an acyclic derived-property graph.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_properties()?;

        if self.primary_key.is_empty() {
            return Err(SchemaError::EmptyPrimaryKey {
                record: self.name.clone(),
            });
        }
        for (position, property) in self.primary_key.iter().enumerate() {
            self.require_property(property)?;
            if self.primary_key[..position].contains(property) {
                return Err(SchemaError::DuplicateProperty {
                    context: "primary key".to_string(),
                    property: property.clone(),
                });
            }
        }

        for (position, index) in self.indexes.iter().enumerate() {
            index.validate(self)?;
            if self.indexes[..position]
                .iter()
                .any(|earlier| earlier.name == index.name)
            {
                return Err(SchemaError::DuplicateProperty {
                    context: "index names".to_string(),
                    property: index.name.clone(),
                });
            }
        }

        self.check_derived_cycles()
    }

    fn validate_properties(&self) -> Result<(), SchemaError> {
        for (position, property) in self.properties.iter().enumerate() {
            if self.properties[..position]
                .iter()
                .any(|earlier| earlier.name == property.name)
            {
                return Err(SchemaError::DuplicateProperty {
                    context: format!("record '{}'", self.name),
                    property: property.name.clone(),
                });
            }

            // chained paths must hang off a declared prime property
            if is_chained_path(&property.name) {
                let chain = ChainedProperty::parse(&property.name)?;
                self.require_property(chain.prime())?;
            }

            for source in &property.derived_from {
                self.require_property(source)?;
            }
        }

        Ok(())
    }

    // Depth-first walk with in-progress marks; a revisit while in progress
    // closes a cycle.
    fn check_derived_cycles(&self) -> Result<(), SchemaError> {
        #[derive(Clone, Copy, Eq, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        fn visit<'a>(
            schema: &'a RecordSchema,
            name: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Result<(), SchemaError> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|entry| *entry == name).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(ToString::to_string).collect();
                    cycle.push(name.to_string());

                    return Err(SchemaError::DerivedCycle { path: cycle });
                }
                None => {}
            }

            marks.insert(name, Mark::InProgress);
            path.push(name);

            if let Some(property) = schema.property(name) {
                for source in &property.derived_from {
                    visit(schema, source, marks, path)?;
                }
            }

            path.pop();
            marks.insert(name, Mark::Done);

            Ok(())
        }

        let mut marks = BTreeMap::new();
        let mut path = Vec::new();
        for property in &self.properties {
            visit(self, &property.name, &mut marks, &mut path)?;
        }

        Ok(())
    }
}
