use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

///
/// QueryHint
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryHint {
    /// Caller only consumes a bounded slice of the results, so avoiding a
    /// sort outweighs scan selectivity.
    ConsumeSlice,

    /// Never combine two index scans with an intersection stage.
    NoIntersection,
}

impl Display for QueryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConsumeSlice => "consume_slice",
            Self::NoIntersection => "no_intersection",
        };
        write!(f, "{label}")
    }
}

///
/// QueryHints
///
/// Immutable hint set; `with` returns a new set.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryHints(BTreeSet<QueryHint>);

impl QueryHints {
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn of(hint: QueryHint) -> Self {
        Self::empty().with(hint)
    }

    #[must_use]
    pub fn with(&self, hint: QueryHint) -> Self {
        let mut hints = self.0.clone();
        hints.insert(hint);
        Self(hints)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }

    #[must_use]
    pub fn contains(&self, hint: QueryHint) -> bool {
        self.0.contains(&hint)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = QueryHint> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<QueryHint> for QueryHints {
    fn from_iter<I: IntoIterator<Item = QueryHint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for QueryHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.iter().map(|hint| hint.to_string()).collect();
        write!(f, "{{{}}}", labels.join(", "))
    }
}
