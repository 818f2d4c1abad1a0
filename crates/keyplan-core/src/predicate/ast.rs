use crate::value::Value;
use std::{
    cmp::Ordering,
    fmt::{self, Display},
    ops::{BitAnd, BitOr},
};

///
/// Predicate AST
///
/// Pure, schema-agnostic representation of filter predicates.
/// Interpretation happens in later passes:
///
/// - validation (schema-aware)
/// - normalization
/// - scoring and planning
/// - residual evaluation
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    /// Operator matching exactly the rows this one rejects.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Gte,
            Self::Lte => Self::Gt,
            Self::Gt => Self::Lte,
            Self::Gte => Self::Lt,
        }
    }

    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }

    #[must_use]
    pub const fn is_lower_bound(self) -> bool {
        matches!(self, Self::Gt | Self::Gte)
    }

    #[must_use]
    pub const fn is_upper_bound(self) -> bool {
        matches!(self, Self::Lt | Self::Lte)
    }

    #[must_use]
    pub const fn is_inclusive(self) -> bool {
        matches!(self, Self::Eq | Self::Lte | Self::Gte)
    }

    /// Whether `ordering` (stored value compared with the literal) passes.
    #[must_use]
    pub const fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Ne => !matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Lte => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Gte => !matches!(ordering, Ordering::Less),
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub property: String,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(property: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            property: self.property.clone(),
            op: self.op.negate(),
            value: self.value.clone(),
        }
    }
}

impl Display for ComparePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.property, self.op.symbol(), self.value)
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn compare(property: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(property, op, value))
    }

    #[must_use]
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(property, CompareOp::Gte, value)
    }

    /// `property = null`.
    #[must_use]
    pub fn is_null(property: impl Into<String>) -> Self {
        Self::compare(property, CompareOp::Eq, Value::Null)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, preds: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, pred) in preds.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{pred}")?;
    }
    write!(f, ")")
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::And(preds) => write_joined(f, preds, "AND"),
            Self::Or(preds) => write_joined(f, preds, "OR"),
            Self::Not(pred) => write!(f, "NOT {pred}"),
            Self::Compare(cmp) => write!(f, "{cmp}"),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}
