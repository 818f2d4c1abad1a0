use crate::{
    codec::{KeyDecodeError, KeyEncodeError},
    model::schema::SchemaError,
    predicate::ValidateError,
    store::BackendError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// `class` tells the caller whether the failure is a data problem, a usage
/// problem, or a backend problem; `origin` names the layer that raised it.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    #[source]
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Construct a corruption error for a specific origin.
    pub(crate) fn corruption(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, origin, message)
    }

    /// Construct a planner-origin usage error.
    pub(crate) fn planner_inapplicable(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Inapplicable, ErrorOrigin::Planner, message)
    }

    /// Construct a planner-origin invariant violation.
    pub(crate) fn planner_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Planner, message)
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message,
        )
    }

    /// Construct an executor-origin unsupported error.
    pub(crate) fn executor_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Executor, message)
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class, ErrorClass::Corruption)
    }

    #[must_use]
    pub const fn is_backend_failure(&self) -> bool {
        matches!(self.class, ErrorClass::BackendFailure)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<KeyDecodeError> for InternalError {
    fn from(err: KeyDecodeError) -> Self {
        Self::corruption(ErrorOrigin::Codec, format!("key decode failed: {err}"))
            .with_detail(ErrorDetail::Decode(err))
    }
}

impl From<KeyEncodeError> for InternalError {
    fn from(err: KeyEncodeError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Codec,
            format!("key encode failed: {err}"),
        )
        .with_detail(ErrorDetail::Encode(err))
    }
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        let class = match &err {
            SchemaError::ChainedPropertyOutOfRange { .. } => ErrorClass::Inapplicable,
            _ => ErrorClass::InvariantViolation,
        };

        Self::new(class, ErrorOrigin::Schema, err.to_string()).with_detail(ErrorDetail::Schema(err))
    }
}

impl From<ValidateError> for InternalError {
    fn from(err: ValidateError) -> Self {
        Self::planner_inapplicable(format!("filter rejected by schema: {err}"))
            .with_detail(ErrorDetail::Validate(err))
    }
}

impl From<BackendError> for InternalError {
    fn from(err: BackendError) -> Self {
        Self::new(
            ErrorClass::BackendFailure,
            ErrorOrigin::Backend,
            format!("backend fetch failed: {err}"),
        )
        .with_detail(ErrorDetail::Backend(err))
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Decode(KeyDecodeError),
    #[error("{0}")]
    Encode(KeyEncodeError),
    #[error("{0}")]
    Schema(SchemaError),
    #[error("{0}")]
    Validate(ValidateError),
    #[error("{0}")]
    Backend(BackendError),
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Bytes inconsistent with the expected encoding grammar.
    Corruption,
    /// Caller asked for something outside the valid range of a model.
    Inapplicable,
    /// The supplied storage backend raised an error.
    BackendFailure,
    InvariantViolation,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::Inapplicable => "inapplicable",
            Self::BackendFailure => "backend_failure",
            Self::InvariantViolation => "invariant_violation",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Schema,
    Planner,
    Executor,
    Backend,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Schema => "schema",
            Self::Planner => "planner",
            Self::Executor => "executor",
            Self::Backend => "backend",
        };
        write!(f, "{label}")
    }
}
