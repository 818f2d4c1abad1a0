use crate::codec::Direction;
use std::fmt::{self, Display};

///
/// OrderingTerm
///
/// One `(property, direction)` entry of a requested ordering.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OrderingTerm {
    pub property: String,
    pub direction: Direction,
}

impl OrderingTerm {
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

impl Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sign(), self.property)
    }
}

///
/// OrderingSpec
///
/// Requested result ordering. Properties never repeat: a later term on an
/// already ordered property can never change the result order, so it is
/// dropped on insertion. An empty spec means no ordering was requested.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct OrderingSpec {
    terms: Vec<OrderingTerm>,
}

impl OrderingSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Build from terms, dropping repeated properties.
    #[must_use]
    pub fn from_terms(terms: impl IntoIterator<Item = OrderingTerm>) -> Self {
        terms.into_iter().fold(Self::new(), Self::push)
    }

    #[must_use]
    pub fn then(self, property: impl Into<String>, direction: Direction) -> Self {
        self.push(OrderingTerm::new(property, direction))
    }

    #[must_use]
    pub fn then_asc(self, property: impl Into<String>) -> Self {
        self.then(property, Direction::Asc)
    }

    #[must_use]
    pub fn then_desc(self, property: impl Into<String>) -> Self {
        self.then(property, Direction::Desc)
    }

    fn push(mut self, term: OrderingTerm) -> Self {
        if !self.contains(&term.property) {
            self.terms.push(term);
        }
        self
    }

    #[must_use]
    pub fn terms(&self) -> &[OrderingTerm] {
        &self.terms
    }

    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.terms.iter().any(|term| term.property == property)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Append the primary key properties (ascending) that are not already
    /// ordered, giving a total order over distinct records.
    #[must_use]
    pub fn with_tiebreak(&self, primary_key: &[String]) -> Self {
        primary_key
            .iter()
            .fold(self.clone(), |spec, property| spec.then_asc(property.clone()))
    }

    /// Split into the first `count` terms and the rest.
    #[must_use]
    pub fn split_at(&self, count: usize) -> (Self, Self) {
        let count = count.min(self.terms.len());
        let (head, tail) = self.terms.split_at(count);

        (
            Self {
                terms: head.to_vec(),
            },
            Self {
                terms: tail.to_vec(),
            },
        )
    }
}

impl Display for OrderingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.terms.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

impl<'a> IntoIterator for &'a OrderingSpec {
    type Item = &'a OrderingTerm;
    type IntoIter = std::slice::Iter<'a, OrderingTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}
