use crate::{
    model::{index::IndexSpec, ordering::OrderingSpec},
    plan::{FilteringScore, OrderingScore, QueryHint, QueryHints},
    predicate::ComparePredicate,
};
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};

///
/// CompositeScore
///
/// Filtering and ordering score of one candidate access path.
/// `index == None` is the full scan, which is always a candidate.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeScore {
    pub filtering: FilteringScore,
    pub ordering: OrderingScore,
    pub index: Option<IndexSpec>,
}

impl CompositeScore {
    #[must_use]
    pub fn evaluate(
        index: &IndexSpec,
        terms: &[ComparePredicate],
        ordering: &OrderingSpec,
    ) -> Self {
        let filtering = FilteringScore::evaluate(index, terms);
        let ordering = OrderingScore::evaluate(index, ordering, &filtering);

        Self {
            filtering,
            ordering,
            index: Some(index.clone()),
        }
    }

    #[must_use]
    pub fn full_scan(terms: &[ComparePredicate], ordering: &OrderingSpec) -> Self {
        Self {
            filtering: FilteringScore::full_scan(terms),
            ordering: OrderingScore::full_scan(ordering),
            index: None,
        }
    }

    #[must_use]
    pub const fn is_full_scan(&self) -> bool {
        self.index.is_none()
    }

    #[must_use]
    pub fn is_clustered(&self) -> bool {
        self.index.as_ref().is_some_and(|index| index.clustered)
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.index.as_ref().is_some_and(|index| index.unique)
    }

    /// Total order over candidate scores for `hints`; `Less` is better.
    pub fn full_comparator(hints: &QueryHints) -> impl Fn(&Self, &Self) -> Ordering + use<> {
        let consume_slice = hints.contains(QueryHint::ConsumeSlice);

        move |a, b| {
            if consume_slice {
                cmp_remaining_ordering(a, b).then_with(|| cmp_default(a, b))
            } else {
                cmp_default(a, b)
            }
        }
    }

    /// Compare two scores under `hints`.
    #[must_use]
    pub fn compare(&self, other: &Self, hints: &QueryHints) -> Ordering {
        Self::full_comparator(hints)(self, other)
    }
}

// Default weighting: selectivity first, then sort avoidance, then flags.
fn cmp_default(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    cmp_selectivity(a, b)
        .then_with(|| cmp_unselective_access(a, b))
        .then_with(|| cmp_remaining_ordering(a, b))
        .then_with(|| cmp_residual(a, b))
        .then_with(|| cmp_flag(a.is_clustered(), b.is_clustered()))
        .then_with(|| cmp_flag(a.is_unique(), b.is_unique()))
        .then_with(|| cmp_ordinal(a, b))
}

fn cmp_selectivity(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    b.filtering
        .identity_count
        .cmp(&a.filtering.identity_count)
        .then_with(|| {
            b.filtering
                .range_bound_count()
                .cmp(&a.filtering.range_bound_count())
        })
}

// Between two plans that narrow nothing, reading the records directly (a
// full scan or a clustered index) beats walking a separate index structure.
fn cmp_unselective_access(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    if !a.filtering.is_unselective() || !b.filtering.is_unselective() {
        return Ordering::Equal;
    }

    let direct = |score: &CompositeScore| score.is_full_scan() || score.is_clustered();
    cmp_flag(direct(a), direct(b))
}

fn cmp_remaining_ordering(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    a.ordering.remaining_count().cmp(&b.ordering.remaining_count())
}

fn cmp_residual(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    cmp_flag(
        !a.filtering.has_remaining_filter(),
        !b.filtering.has_remaining_filter(),
    )
}

// `true` sorts first.
fn cmp_flag(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

// Declaration order; the full scan comes last.
fn cmp_ordinal(a: &CompositeScore, b: &CompositeScore) -> Ordering {
    let ordinal = |score: &CompositeScore| {
        score
            .index
            .as_ref()
            .map_or(usize::MAX, |index| index.ordinal)
    };

    ordinal(a).cmp(&ordinal(b))
}

impl Display for CompositeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{index}")?,
            None => write!(f, "full_scan")?,
        }

        write!(
            f,
            " identity={} range={} residual={} handled={} remaining={}",
            self.filtering.identity_count,
            self.filtering.range_bound_count(),
            self.filtering.remaining.len(),
            self.ordering.handled_count,
            self.ordering.remaining_ordering,
        )
    }
}
