//! Planning from a validated filter and ordering to a composed plan tree.
//!
//! Determinism: candidates are scored in declaration order and ranked by a
//! total comparator, so the same schema, filter, ordering, and hints always
//! produce an identical plan.

use crate::{
    config::PlannerConfig,
    error::InternalError,
    model::{index::IndexSpec, ordering::OrderingSpec, schema::RecordSchema},
    plan::{CompositeScore, PlanNode, QueryHint, QueryHints, QueryPlan, key_range},
    predicate::{ComparePredicate, Conjunction, Dnf, Predicate, normalize, validate},
};
use tracing::debug;

///
/// BranchPlan
///
/// Access path chosen for one DNF branch, before the final sort.
///

struct BranchPlan {
    /// Scan plus residual filter.
    access: PlanNode,
    /// Ordering the access path already produces.
    handled: OrderingSpec,
    /// Properties fixed to one value by identity matches in this branch.
    fixed: Vec<String>,
    full_scan: bool,
}

impl BranchPlan {
    fn full_scan(branch: &Conjunction) -> Self {
        Self {
            access: PlanNode::FullScan.filter(branch.to_predicate()),
            handled: OrderingSpec::new(),
            fixed: Vec::new(),
            full_scan: true,
        }
    }

    // Attach the sort that turns the access order into `target`. Fixed
    // properties never change within the branch, so they need no sorting.
    fn sorted(self, target: &OrderingSpec) -> PlanNode {
        let remaining = OrderingSpec::from_terms(
            target
                .terms()
                .iter()
                .filter(|term| {
                    !self.handled.contains(&term.property) && !self.fixed.contains(&term.property)
                })
                .cloned(),
        );

        self.access.sort(self.handled, remaining)
    }
}

/// Plan `filter` and `ordering` against `schema`.
///
/// `hints` are merged with `config.default_hints`. Fails when the filter or
/// ordering names a property the schema does not declare, or a literal does
/// not fit its property kind.
pub fn plan_query(
    schema: &RecordSchema,
    filter: &Predicate,
    ordering: &OrderingSpec,
    hints: &QueryHints,
    config: &PlannerConfig,
) -> Result<QueryPlan, InternalError> {
    validate(schema, filter)?;
    validate_ordering(schema, ordering)?;

    let hints = hints.union(&config.default_hints);
    let root = match normalize(filter, config.max_dnf_branches) {
        Ok(dnf) if dnf.is_false() => PlanNode::Empty,
        Ok(dnf) => plan_dnf(schema, &dnf, filter, ordering, &hints, config)?,
        Err(overflow) => {
            debug!(limit = overflow.limit, "filter too wide to normalise, planning full scan");
            collapsed(filter, ordering)
        }
    };

    let plan = QueryPlan::new(root, ordering.clone(), config.sort_buffer_limit);
    debug!(kind = %plan.kind, hints = %hints, plan = %plan.root, "selected query plan");

    Ok(plan)
}

fn validate_ordering(schema: &RecordSchema, ordering: &OrderingSpec) -> Result<(), InternalError> {
    for term in ordering {
        if schema.property(&term.property).is_none() {
            return Err(InternalError::planner_inapplicable(format!(
                "ordering names unknown property '{}'",
                term.property
            )));
        }
    }

    Ok(())
}

fn plan_dnf(
    schema: &RecordSchema,
    dnf: &Dnf,
    filter: &Predicate,
    ordering: &OrderingSpec,
    hints: &QueryHints,
    config: &PlannerConfig,
) -> Result<PlanNode, InternalError> {
    let mut branches = dnf
        .branches
        .iter()
        .enumerate()
        .map(|(position, branch)| plan_branch(schema, position, branch, ordering, hints, config))
        .collect::<Result<Vec<_>, _>>()?;

    if branches.len() == 1
        && let Some(branch) = branches.pop()
    {
        return Ok(branch.sorted(ordering));
    }

    // one unindexed branch reads every record anyway
    if branches.iter().any(|branch| branch.full_scan) {
        debug!(branches = branches.len(), "branch needs a full scan, collapsing union");
        return Ok(collapsed(filter, ordering));
    }

    let total = ordering.with_tiebreak(&schema.primary_key);
    let mut inputs: Vec<PlanNode> = branches
        .into_iter()
        .filter(|branch| !branch.access.is_empty())
        .map(|branch| branch.sorted(&total))
        .collect();

    Ok(match inputs.len() {
        0 => PlanNode::Empty,
        1 => inputs.remove(0),
        _ => PlanNode::Union {
            inputs,
            ordering: total,
        },
    })
}

// Whole filter residual over one full scan, sorted afterwards.
fn collapsed(filter: &Predicate, ordering: &OrderingSpec) -> PlanNode {
    PlanNode::FullScan
        .filter(filter.clone())
        .sort(OrderingSpec::new(), ordering.clone())
}

fn plan_branch(
    schema: &RecordSchema,
    position: usize,
    branch: &Conjunction,
    ordering: &OrderingSpec,
    hints: &QueryHints,
    config: &PlannerConfig,
) -> Result<BranchPlan, InternalError> {
    let best = best_candidate(schema, position, &branch.terms, ordering, hints);
    let Some(index) = &best.index else {
        return Ok(BranchPlan::full_scan(branch));
    };

    if let Some(plan) = plan_intersection(schema, &best, index, hints, config)? {
        return Ok(plan);
    }

    let access = scan_node(schema, index, &best)?.filter(residual(&best.filtering.remaining));

    Ok(BranchPlan {
        access,
        handled: best.ordering.handled.clone(),
        fixed: fixed_properties(index, &best),
        full_scan: false,
    })
}

// Score every index plus the full scan and keep the minimum.
fn best_candidate(
    schema: &RecordSchema,
    position: usize,
    terms: &[ComparePredicate],
    ordering: &OrderingSpec,
    hints: &QueryHints,
) -> CompositeScore {
    let cmp = CompositeScore::full_comparator(hints);
    let full_scan = CompositeScore::full_scan(terms, ordering);
    debug!(branch = position, candidate = %full_scan, "scored access path");

    schema
        .indexes
        .iter()
        .map(|index| CompositeScore::evaluate(index, terms, ordering))
        .fold(full_scan, |best, candidate| {
            debug!(branch = position, candidate = %candidate, "scored access path");
            if cmp(&candidate, &best).is_lt() {
                candidate
            } else {
                best
            }
        })
}

// Intersect the best index with a second one whose identity covers part of
// the residual. Not applied when a scan already delivers requested order,
// since the primary-key merge would discard it.
fn plan_intersection(
    schema: &RecordSchema,
    best: &CompositeScore,
    index: &IndexSpec,
    hints: &QueryHints,
    config: &PlannerConfig,
) -> Result<Option<BranchPlan>, InternalError> {
    if !best.filtering.has_remaining_filter()
        || hints.contains(QueryHint::NoIntersection)
        || !config.enable_intersection
        || best.ordering.handled_count > 0
    {
        return Ok(None);
    }

    let cmp = CompositeScore::full_comparator(hints);
    let unordered = OrderingSpec::new();
    let second = schema
        .indexes
        .iter()
        .filter(|candidate| candidate.name != index.name)
        .map(|candidate| CompositeScore::evaluate(candidate, &best.filtering.remaining, &unordered))
        .filter(|score| score.filtering.identity_count > 0)
        .min_by(|a, b| cmp(a, b));
    let Some(second) = second else {
        return Ok(None);
    };
    let Some(second_index) = &second.index else {
        return Ok(None);
    };
    debug!(left = %index.name, right = %second_index.name, "intersecting index scans");

    let left = scan_node(schema, index, best)?;
    let right = scan_node(schema, second_index, &second)?;
    let access = if left.is_empty() || right.is_empty() {
        PlanNode::Empty
    } else {
        let by_pk = schema.primary_key_ordering();
        PlanNode::Intersection {
            left: Box::new(left.sort(OrderingSpec::new(), by_pk.clone())),
            right: Box::new(right.sort(OrderingSpec::new(), by_pk)),
        }
        .filter(residual(&second.filtering.remaining))
    };

    let mut fixed = fixed_properties(index, best);
    fixed.extend(fixed_properties(second_index, &second));

    Ok(Some(BranchPlan {
        access,
        handled: OrderingSpec::new(),
        fixed,
        full_scan: false,
    }))
}

fn scan_node(
    schema: &RecordSchema,
    index: &IndexSpec,
    score: &CompositeScore,
) -> Result<PlanNode, InternalError> {
    let range = key_range(schema, index, &score.filtering)?;
    if range.is_empty() {
        return Ok(PlanNode::Empty);
    }

    Ok(PlanNode::IndexScan {
        index: index.clone(),
        range,
        reverse: score.ordering.should_reverse_scan,
    })
}

fn residual(terms: &[ComparePredicate]) -> Predicate {
    Conjunction::new(terms.to_vec()).to_predicate()
}

fn fixed_properties(index: &IndexSpec, score: &CompositeScore) -> Vec<String> {
    index
        .properties
        .iter()
        .take(score.filtering.identity_count)
        .map(|entry| entry.property.clone())
        .collect()
}
