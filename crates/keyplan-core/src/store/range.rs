use crate::codec::EncodedKey;
use std::{
    fmt::{self, Display},
    ops::Bound,
};

///
/// KeyRange
///
/// Byte range over full index keys.
///
/// Every key in range starts with `prefix`. Bounds are full keys (prefix
/// included) and use prefix semantics: a key that extends a bound shares
/// its position, so `Excluded(b)` as a lower bound also skips every key
/// starting with `b`, and `Included(b)` as an upper bound keeps them.
/// This matches composite keys, where trailing components follow the
/// bounded one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyRange {
    pub prefix: EncodedKey,
    pub lower: Bound<EncodedKey>,
    pub upper: Bound<EncodedKey>,
}

impl KeyRange {
    /// Range covering every key that starts with `prefix`.
    #[must_use]
    pub const fn prefix(prefix: EncodedKey) -> Self {
        Self {
            prefix,
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Range covering the whole index.
    #[must_use]
    pub fn all() -> Self {
        Self::prefix(EncodedKey::default())
    }

    #[must_use]
    pub fn with_bounds(mut self, lower: Bound<EncodedKey>, upper: Bound<EncodedKey>) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        if !key.starts_with(&self.prefix) {
            return false;
        }

        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(bound) => key >= bound.as_bytes(),
            Bound::Excluded(bound) => key > bound.as_bytes() && !key.starts_with(bound),
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(bound) => key <= bound.as_bytes() || key.starts_with(bound),
            Bound::Excluded(bound) => key < bound.as_bytes(),
        };

        above_lower && below_upper
    }

    /// Whether the bounds leave no key at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Included(lo) | Bound::Excluded(lo), Bound::Excluded(hi)) => lo >= hi,
            (Bound::Excluded(lo), Bound::Included(hi)) => lo > hi && !lo.starts_with(hi),
            (Bound::Included(lo), Bound::Included(hi)) => lo > hi && !lo.starts_with(hi),
            _ => false,
        }
    }
}

impl Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |bound: &Bound<EncodedKey>, open: &str, closed: &str| match bound {
            Bound::Unbounded => "*".to_string(),
            Bound::Included(key) => format!("{closed}{key:?}"),
            Bound::Excluded(key) => format!("{open}{key:?}"),
        };

        write!(
            f,
            "prefix={:?} lower={} upper={}",
            self.prefix,
            render(&self.lower, ">", ">="),
            render(&self.upper, "<", "<=")
        )
    }
}
