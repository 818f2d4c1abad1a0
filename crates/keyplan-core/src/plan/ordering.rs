use crate::{
    model::{index::IndexSpec, ordering::OrderingSpec},
    plan::FilteringScore,
};

///
/// OrderingScore
///
/// How much of a requested ordering an index scan delivers for free.
///
/// Ordering terms on identity-matched properties are dropped first, since a
/// fixed value cannot change the order. `handled` is the prefix of the
/// remaining terms the scan produces; `remaining_ordering` needs a sort.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderingScore {
    pub handled_count: usize,
    pub handled: OrderingSpec,
    pub remaining_ordering: OrderingSpec,
    /// The index must be traversed backwards to produce `handled`.
    pub should_reverse_scan: bool,
}

impl OrderingScore {
    #[must_use]
    pub fn evaluate(
        index: &IndexSpec,
        ordering: &OrderingSpec,
        filtering: &FilteringScore,
    ) -> Self {
        let identity = &index.properties[..filtering.identity_count.min(index.len())];
        let effective = OrderingSpec::from_terms(
            ordering
                .terms()
                .iter()
                .filter(|term| !identity.iter().any(|entry| entry.property == term.property))
                .cloned(),
        );

        // at most one row matches, so any order is already satisfied
        if index.unique && filtering.identity_count == index.len() {
            return Self {
                handled_count: effective.len(),
                handled: effective,
                remaining_ordering: OrderingSpec::new(),
                should_reverse_scan: filtering.should_reverse_order,
            };
        }

        let mut reverse: Option<bool> = None;
        let mut handled_count = 0;
        for (entry, term) in index.properties[identity.len()..]
            .iter()
            .zip(effective.terms())
        {
            if entry.property != term.property {
                break;
            }

            let needs_reverse = entry.direction != term.direction;
            match reverse {
                None => reverse = Some(needs_reverse),
                Some(current) if current != needs_reverse => break,
                Some(_) => {}
            }
            handled_count += 1;
        }

        let (handled, remaining_ordering) = effective.split_at(handled_count);

        Self {
            handled_count,
            handled,
            remaining_ordering,
            should_reverse_scan: reverse.unwrap_or(filtering.should_reverse_order),
        }
    }

    /// Score for a scan that delivers no order.
    #[must_use]
    pub fn full_scan(ordering: &OrderingSpec) -> Self {
        Self {
            remaining_ordering: ordering.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn remaining_count(&self) -> usize {
        self.remaining_ordering.len()
    }

    #[must_use]
    pub const fn needs_sort(&self) -> bool {
        !self.remaining_ordering.is_empty()
    }
}
