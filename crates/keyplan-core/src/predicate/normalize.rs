//! Disjunctive normal form.
//!
//! Negations are pushed down to the comparisons first (every operator has an
//! exact complement under the total value order), then conjunctions are
//! distributed over disjunctions. Each resulting branch is one conjunction
//! of comparison terms the scorer can match against an index.

use crate::predicate::{ComparePredicate, Predicate};
use thiserror::Error as ThisError;

///
/// Conjunction
///
/// One DNF branch. An empty conjunction is `true`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Conjunction {
    pub terms: Vec<ComparePredicate>,
}

impl Conjunction {
    #[must_use]
    pub const fn new(terms: Vec<ComparePredicate>) -> Self {
        Self { terms }
    }

    #[must_use]
    pub const fn is_true(&self) -> bool {
        self.terms.is_empty()
    }

    // Merge two conjunctions, keeping the first occurrence of each term.
    fn and(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        for term in &other.terms {
            if !terms.contains(term) {
                terms.push(term.clone());
            }
        }

        Self { terms }
    }

    /// Rebuild the conjunction as a predicate tree.
    #[must_use]
    pub fn to_predicate(&self) -> Predicate {
        match self.terms.as_slice() {
            [] => Predicate::True,
            [term] => Predicate::Compare(term.clone()),
            terms => Predicate::And(terms.iter().cloned().map(Predicate::Compare).collect()),
        }
    }
}

///
/// Dnf
///
/// Disjunction of conjunctions. No branches means `false`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dnf {
    pub branches: Vec<Conjunction>,
}

impl Dnf {
    #[must_use]
    pub const fn is_false(&self) -> bool {
        self.branches.is_empty()
    }

    #[must_use]
    pub fn is_true(&self) -> bool {
        self.branches.iter().any(Conjunction::is_true)
    }

    fn always() -> Self {
        Self {
            branches: vec![Conjunction::default()],
        }
    }

    // A `true` branch absorbs every other branch; repeated branches collapse.
    fn simplify(mut self) -> Self {
        if self.is_true() {
            return Self::always();
        }

        let mut branches: Vec<Conjunction> = Vec::with_capacity(self.branches.len());
        for branch in self.branches.drain(..) {
            if !branches.contains(&branch) {
                branches.push(branch);
            }
        }

        Self { branches }
    }
}

///
/// DnfOverflow
///
/// Normalisation would produce more branches than the configured cap.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("disjunctive normal form exceeds {limit} branches")]
pub struct DnfOverflow {
    pub limit: usize,
}

/// Normalise `predicate` into at most `max_branches` conjunctions.
pub fn normalize(predicate: &Predicate, max_branches: usize) -> Result<Dnf, DnfOverflow> {
    let nnf = push_negations(predicate, false);

    to_dnf(&nnf, max_branches.max(1)).map(Dnf::simplify)
}

// Negation normal form: `Not` only ever disappears into flipped operators.
fn push_negations(predicate: &Predicate, negated: bool) -> Predicate {
    match (predicate, negated) {
        (Predicate::True, false) | (Predicate::False, true) => Predicate::True,
        (Predicate::True, true) | (Predicate::False, false) => Predicate::False,
        (Predicate::Compare(cmp), false) => Predicate::Compare(cmp.clone()),
        (Predicate::Compare(cmp), true) => Predicate::Compare(cmp.negate()),
        (Predicate::Not(inner), _) => push_negations(inner, !negated),
        (Predicate::And(preds), false) | (Predicate::Or(preds), true) => {
            Predicate::And(preds.iter().map(|p| push_negations(p, negated)).collect())
        }
        (Predicate::And(preds), true) | (Predicate::Or(preds), false) => {
            Predicate::Or(preds.iter().map(|p| push_negations(p, negated)).collect())
        }
    }
}

fn to_dnf(predicate: &Predicate, limit: usize) -> Result<Dnf, DnfOverflow> {
    match predicate {
        Predicate::True => Ok(Dnf::always()),
        Predicate::False => Ok(Dnf::default()),
        Predicate::Compare(cmp) => Ok(Dnf {
            branches: vec![Conjunction::new(vec![cmp.clone()])],
        }),
        Predicate::Or(preds) => {
            let mut branches = Vec::new();
            for pred in preds {
                let dnf = to_dnf(pred, limit)?.simplify();
                if dnf.is_true() {
                    return Ok(Dnf::always());
                }
                branches.extend(dnf.branches);
                if branches.len() > limit {
                    return Err(DnfOverflow { limit });
                }
            }

            Ok(Dnf { branches })
        }
        Predicate::And(preds) => {
            let mut acc = Dnf::always();
            for pred in preds {
                let rhs = to_dnf(pred, limit)?.simplify();
                if rhs.is_false() {
                    return Ok(Dnf::default());
                }

                let product = acc.branches.len() * rhs.branches.len();
                if product > limit {
                    return Err(DnfOverflow { limit });
                }

                let mut branches = Vec::with_capacity(product);
                for left in &acc.branches {
                    for right in &rhs.branches {
                        branches.push(left.and(right));
                    }
                }
                acc = Dnf { branches }.simplify();
            }

            Ok(acc)
        }
        // negations were pushed down already
        Predicate::Not(inner) => to_dnf(&push_negations(inner, true), limit),
    }
}
