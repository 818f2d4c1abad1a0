use crate::{
    model::schema::RecordSchema,
    predicate::{ComparePredicate, Predicate},
};
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// A filter that cannot be evaluated against the record schema.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("unknown property '{property}'")]
    UnknownProperty { property: String },

    #[error("property '{property}' is {expected}; literal {literal} does not match")]
    LiteralKindMismatch {
        property: String,
        expected: &'static str,
        literal: String,
    },

    #[error("property '{property}' is not nullable and cannot be compared to null")]
    NullOnRequired { property: String },
}

/// Validate every comparison in `predicate` against `schema`.
pub fn validate(schema: &RecordSchema, predicate: &Predicate) -> Result<(), ValidateError> {
    match predicate {
        Predicate::True | Predicate::False => Ok(()),
        Predicate::And(preds) | Predicate::Or(preds) => preds
            .iter()
            .try_for_each(|pred| validate(schema, pred)),
        Predicate::Not(pred) => validate(schema, pred),
        Predicate::Compare(cmp) => validate_compare(schema, cmp),
    }
}

fn validate_compare(schema: &RecordSchema, cmp: &ComparePredicate) -> Result<(), ValidateError> {
    let property = schema
        .property(&cmp.property)
        .ok_or_else(|| ValidateError::UnknownProperty {
            property: cmp.property.clone(),
        })?;

    if cmp.value.is_null() && !property.nullable {
        return Err(ValidateError::NullOnRequired {
            property: cmp.property.clone(),
        });
    }
    if !property.accepts(&cmp.value) {
        return Err(ValidateError::LiteralKindMismatch {
            property: cmp.property.clone(),
            expected: property.kind.label(),
            literal: cmp.value.to_string(),
        });
    }

    Ok(())
}
