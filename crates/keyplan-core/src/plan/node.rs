use crate::{
    model::{index::IndexSpec, ordering::OrderingSpec},
    obs::PlanKind,
    predicate::Predicate,
    store::KeyRange,
};
use std::fmt::{self, Display};

///
/// PlanNode
///
/// One stage of a composed plan. Leaves read from the backend, inner nodes
/// transform the stream of their inputs.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlanNode {
    /// Yields nothing; the filter is contradictory or the range empty.
    Empty,

    IndexScan {
        index: IndexSpec,
        range: KeyRange,
        reverse: bool,
    },

    /// Every record, in primary-key order.
    FullScan,

    /// Re-check `predicate` on every record of `input`.
    Filter {
        input: Box<Self>,
        predicate: Predicate,
    },

    /// `input` is already ordered by `handled`; runs of rows with equal
    /// `handled` values are sorted by `remaining`.
    Sort {
        input: Box<Self>,
        handled: OrderingSpec,
        remaining: OrderingSpec,
    },

    /// Ordered merge of inputs that are each sorted by `ordering`, which
    /// always ends with the primary key. Rows with equal primary keys are
    /// emitted once.
    Union {
        inputs: Vec<Self>,
        ordering: OrderingSpec,
    },

    /// Rows present in both inputs, which are sorted by primary key.
    Intersection {
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl PlanNode {
    #[must_use]
    pub fn filter(self, predicate: Predicate) -> Self {
        match predicate {
            Predicate::True => self,
            _ if self.is_empty() => self,
            predicate => Self::Filter {
                input: Box::new(self),
                predicate,
            },
        }
    }

    /// Wrap in a sort stage unless `remaining` is empty.
    #[must_use]
    pub fn sort(self, handled: OrderingSpec, remaining: OrderingSpec) -> Self {
        if remaining.is_empty() || matches!(self, Self::Empty) {
            return self;
        }

        Self::Sort {
            input: Box::new(self),
            handled,
            remaining,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Access kind of the subtree, looking through filter and sort stages.
    #[must_use]
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Empty => PlanKind::Empty,
            Self::IndexScan { .. } => PlanKind::IndexScan,
            Self::FullScan => PlanKind::FullScan,
            Self::Filter { input, .. } | Self::Sort { input, .. } => input.kind(),
            Self::Union { .. } => PlanKind::Union,
            Self::Intersection { .. } => PlanKind::Intersection,
        }
    }

    /// Indexes scanned anywhere in the subtree, in tree order.
    #[must_use]
    pub fn scanned_indexes(&self) -> Vec<&IndexSpec> {
        let mut out = Vec::new();
        self.collect_indexes(&mut out);
        out
    }

    fn collect_indexes<'a>(&'a self, out: &mut Vec<&'a IndexSpec>) {
        match self {
            Self::Empty | Self::FullScan => {}
            Self::IndexScan { index, .. } => out.push(index),
            Self::Filter { input, .. } | Self::Sort { input, .. } => input.collect_indexes(out),
            Self::Union { inputs, .. } => {
                for input in inputs {
                    input.collect_indexes(out);
                }
            }
            Self::Intersection { left, right } => {
                left.collect_indexes(out);
                right.collect_indexes(out);
            }
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);

        match self {
            Self::Empty => writeln!(f, "{indent}empty"),
            Self::IndexScan {
                index,
                range,
                reverse,
            } => writeln!(f, "{indent}index_scan {index} {range} reverse={reverse}"),
            Self::FullScan => writeln!(f, "{indent}full_scan"),
            Self::Filter { input, predicate } => {
                writeln!(f, "{indent}filter {predicate}")?;
                input.fmt_tree(f, depth + 1)
            }
            Self::Sort {
                input,
                handled,
                remaining,
            } => {
                writeln!(f, "{indent}sort handled={handled} remaining={remaining}")?;
                input.fmt_tree(f, depth + 1)
            }
            Self::Union { inputs, ordering } => {
                writeln!(f, "{indent}union ordering={ordering}")?;
                for input in inputs {
                    input.fmt_tree(f, depth + 1)?;
                }
                Ok(())
            }
            Self::Intersection { left, right } => {
                writeln!(f, "{indent}intersection")?;
                left.fmt_tree(f, depth + 1)?;
                right.fmt_tree(f, depth + 1)
            }
        }
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

///
/// QueryPlan
///
/// Output of `plan_query`: the stage tree plus what the executor needs to
/// run it. The root's output is ordered by `ordering`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryPlan {
    pub root: PlanNode,
    pub ordering: OrderingSpec,
    pub sort_buffer_limit: usize,
    pub kind: PlanKind,
}

impl QueryPlan {
    #[must_use]
    pub fn new(root: PlanNode, ordering: OrderingSpec, sort_buffer_limit: usize) -> Self {
        let kind = root.kind();

        Self {
            root,
            ordering,
            sort_buffer_limit,
            kind,
        }
    }

    /// Human-readable rendering of the stage tree, one stage per line.
    #[must_use]
    pub fn explain(&self) -> String {
        self.to_string()
    }
}

impl Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "plan kind={} ordering={}", self.kind, self.ordering)?;
        self.root.fmt_tree(f, 1)
    }
}
