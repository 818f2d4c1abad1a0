use crate::{
    model::index::IndexSpec,
    predicate::{CompareOp, ComparePredicate},
    value::Value,
};
use std::cmp::Ordering;

///
/// RangeBound
///
/// One side of a natural-value range on a single property.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeBound {
    pub value: Value,
    pub inclusive: bool,
}

impl RangeBound {
    // Whether `self` admits fewer values than `other` on the given side.
    fn is_tighter(&self, other: &Self, lower: bool) -> bool {
        match self.value.cmp_natural(&other.value) {
            Ordering::Equal => !self.inclusive && other.inclusive,
            Ordering::Greater => lower,
            Ordering::Less => !lower,
        }
    }
}

///
/// FilteringScore
///
/// How much of one conjunction an index satisfies by itself.
///
/// Leading equality terms fix an identity prefix; range terms on the next
/// index property narrow the scan; every other term stays residual and is
/// re-checked per record.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilteringScore {
    pub identity_count: usize,
    /// Equality literals, in index order.
    pub identity_values: Vec<Value>,
    pub range_start: Option<RangeBound>,
    pub range_end: Option<RangeBound>,
    /// The range property is stored descending, so its natural-value bounds
    /// map to swapped encoded bounds and a forward scan yields the range in
    /// descending natural order.
    pub should_reverse_order: bool,
    pub remaining: Vec<ComparePredicate>,
}

impl FilteringScore {
    /// Score `terms` against `index`.
    #[must_use]
    pub fn evaluate(index: &IndexSpec, terms: &[ComparePredicate]) -> Self {
        let mut consumed = vec![false; terms.len()];
        let mut identity_values = Vec::new();

        for entry in &index.properties {
            let matched = terms.iter().enumerate().find(|(i, term)| {
                !consumed[*i] && term.op == CompareOp::Eq && term.property == entry.property
            });
            let Some((i, term)) = matched else {
                break;
            };

            consumed[i] = true;
            identity_values.push(term.value.clone());
        }

        let identity_count = identity_values.len();
        let mut range_start: Option<RangeBound> = None;
        let mut range_end: Option<RangeBound> = None;
        let mut should_reverse_order = false;

        if let Some(entry) = index.property(identity_count) {
            for (i, term) in terms.iter().enumerate() {
                if consumed[i] || !term.op.is_range() || term.property != entry.property {
                    continue;
                }

                let bound = RangeBound {
                    value: term.value.clone(),
                    inclusive: term.op.is_inclusive(),
                };
                let slot = if term.op.is_lower_bound() {
                    &mut range_start
                } else {
                    &mut range_end
                };
                let lower = term.op.is_lower_bound();
                if slot
                    .as_ref()
                    .is_none_or(|current| bound.is_tighter(current, lower))
                {
                    *slot = Some(bound);
                }
                consumed[i] = true;
            }

            should_reverse_order =
                (range_start.is_some() || range_end.is_some()) && entry.direction.is_desc();
        }

        let remaining = terms
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(term, _)| term.clone())
            .collect();

        Self {
            identity_count,
            identity_values,
            range_start,
            range_end,
            should_reverse_order,
            remaining,
        }
    }

    /// Score for a scan that uses no index: everything is residual.
    #[must_use]
    pub fn full_scan(terms: &[ComparePredicate]) -> Self {
        Self {
            remaining: terms.to_vec(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn has_range(&self) -> bool {
        self.range_start.is_some() || self.range_end.is_some()
    }

    /// Number of range sides (0, 1, or 2).
    #[must_use]
    pub const fn range_bound_count(&self) -> usize {
        match (self.range_start.is_some(), self.range_end.is_some()) {
            (true, true) => 2,
            (false, false) => 0,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn has_remaining_filter(&self) -> bool {
        !self.remaining.is_empty()
    }

    /// Neither identity nor range narrows the scan.
    #[must_use]
    pub const fn is_unselective(&self) -> bool {
        self.identity_count == 0 && !self.has_range()
    }
}
