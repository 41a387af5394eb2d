//! Algebraic simplification of [`LogicExpr`] trees.
//!
//! [`LogicExpr::simplify`] folds a tree bottom-up and repeats the fold until
//! the tree stops changing. Each fold applies, per connective node and in this
//! order:
//!
//! 1. flattening of nested operators with the same connective,
//! 2. constant folding,
//! 3. removal of duplicate children (idempotence, set folding),
//! 4. absorption,
//! 5. numeric interval folding,
//! 6. collapsing single-child `AND`/`OR`.
//!
//! Children keep their author order, so repeated application is stable.

use std::collections::HashMap;

use log::trace;

use crate::logic::{Comparison, Connective, LogicExpr, Subject, Value};

/// Upper bound on fold rounds. A well-formed tree reaches its fixed point in a
/// handful of rounds; the bound only matters for trees holding `NaN`.
const MAX_ROUNDS: usize = 64;

impl LogicExpr {
    /// Returns the simplified form of this expression.
    ///
    /// The result is a fixed point: simplifying it again returns an equal tree.
    pub fn simplify(&self) -> LogicExpr {
        let mut current = fold(self);
        for _ in 0..MAX_ROUNDS {
            let next = fold(&current);
            if next == current {
                break;
            }
            current = next;
        }
        if current != *self {
            trace!(before:% = self, after:% = current; "Simplified logic");
        }
        current
    }
}

fn fold(expr: &LogicExpr) -> LogicExpr {
    match expr {
        LogicExpr::Condition { .. } => expr.clone(),
        LogicExpr::Operator {
            operation: Connective::Not,
            children,
        } => fold_not(children),
        LogicExpr::Operator {
            operation,
            children,
        } => fold_junction(*operation, children.iter().map(fold).collect()),
    }
}

fn fold_not(children: &[LogicExpr]) -> LogicExpr {
    // A NOT with other than one child negates the conjunction of its children.
    let child = match children {
        [child] => fold(child),
        _ => fold_junction(Connective::And, children.iter().map(fold).collect()),
    };

    if child.is_always() {
        return LogicExpr::never();
    }
    if child.is_never() {
        return LogicExpr::always();
    }
    match child {
        LogicExpr::Operator {
            operation: Connective::Not,
            mut children,
        } if children.len() == 1 => children.remove(0),
        child => LogicExpr::not(child),
    }
}

fn fold_junction(operation: Connective, children: Vec<LogicExpr>) -> LogicExpr {
    let children = flatten(operation, children);

    // Constants: the absorbing element decides the whole junction, the
    // neutral element disappears.
    let absorbing = |child: &LogicExpr| match operation {
        Connective::And => child.is_never(),
        _ => child.is_always(),
    };
    if children.iter().any(absorbing) {
        return match operation {
            Connective::And => LogicExpr::never(),
            _ => LogicExpr::always(),
        };
    }
    let children: Vec<_> = children
        .into_iter()
        .filter(|child| match operation {
            Connective::And => !child.is_always(),
            _ => !child.is_never(),
        })
        .collect();

    let children = dedup(children);
    let children = absorb(operation, children);
    let Some(children) = fold_intervals(operation, children) else {
        return LogicExpr::never();
    };

    match children.len() {
        1 => children.into_iter().next().unwrap_or_else(LogicExpr::always),
        _ => LogicExpr::Operator {
            operation,
            children,
        },
    }
}

fn flatten(operation: Connective, children: Vec<LogicExpr>) -> Vec<LogicExpr> {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            LogicExpr::Operator {
                operation: inner,
                children: nested,
            } if inner == operation => flat.extend(nested),
            other => flat.push(other),
        }
    }
    flat
}

fn dedup(children: Vec<LogicExpr>) -> Vec<LogicExpr> {
    let mut unique: Vec<LogicExpr> = Vec::with_capacity(children.len());
    for child in children {
        if !unique.contains(&child) {
            unique.push(child);
        }
    }
    unique
}

/// `AND(x, OR(x, y)) → x` and `OR(x, AND(x, y)) → x`.
fn absorb(operation: Connective, children: Vec<LogicExpr>) -> Vec<LogicExpr> {
    let dual = match operation {
        Connective::And => Connective::Or,
        Connective::Or => Connective::And,
        Connective::Not => return children,
    };

    let absorbed: Vec<bool> = children
        .iter()
        .enumerate()
        .map(|(idx, child)| match child {
            LogicExpr::Operator {
                operation: inner,
                children: nested,
            } if *inner == dual => children
                .iter()
                .enumerate()
                .any(|(other_idx, other)| other_idx != idx && nested.contains(other)),
            _ => false,
        })
        .collect();

    children
        .into_iter()
        .zip(absorbed)
        .filter_map(|(child, absorbed)| (!absorbed).then_some(child))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Bound {
    operation: Comparison,
    value: f64,
}

impl Bound {
    fn to_expr(self, subject: Subject) -> LogicExpr {
        LogicExpr::condition(subject, self.operation, self.value)
    }
}

fn numeric_bound(expr: &LogicExpr) -> Option<(Subject, Bound)> {
    match expr {
        LogicExpr::Condition {
            subject,
            operation,
            value: Value::Number(value),
        } if operation.is_lower_bound() || operation.is_upper_bound() => Some((
            *subject,
            Bound {
                operation: *operation,
                value: *value,
            },
        )),
        _ => None,
    }
}

/// Picks the bound that wins when two bounds of the same direction meet.
///
/// Under `AND` the tighter bound wins, under `OR` the looser one. On equal
/// values the strict bound is tighter.
fn pick(operation: Connective, current: Bound, candidate: Bound) -> Bound {
    let lower = current.operation.is_lower_bound();
    let candidate_is_tighter = if candidate.value == current.value {
        candidate.operation.is_strict() && !current.operation.is_strict()
    } else if lower {
        candidate.value > current.value
    } else {
        candidate.value < current.value
    };

    let take_candidate = match operation {
        Connective::And => candidate_is_tighter,
        _ => {
            let candidate_is_looser = if candidate.value == current.value {
                !candidate.operation.is_strict() && current.operation.is_strict()
            } else {
                !candidate_is_tighter
            };
            candidate_is_looser
        }
    };

    if take_candidate { candidate } else { current }
}

#[derive(Debug, Default)]
struct SubjectBounds {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

/// Folds numeric comparisons on the same subject.
///
/// Returns `None` when a conjunction describes an empty range.
fn fold_intervals(operation: Connective, children: Vec<LogicExpr>) -> Option<Vec<LogicExpr>> {
    if operation == Connective::Not {
        return Some(children);
    }

    let mut bounds: HashMap<Subject, SubjectBounds> = HashMap::new();
    for (subject, bound) in children.iter().filter_map(numeric_bound) {
        let entry = bounds.entry(subject).or_default();
        let slot = if bound.operation.is_lower_bound() {
            &mut entry.lower
        } else {
            &mut entry.upper
        };
        *slot = Some(match *slot {
            Some(current) => pick(operation, current, bound),
            None => bound,
        });
    }

    if operation == Connective::And {
        let empty = bounds.values().any(|entry| match (entry.lower, entry.upper) {
            (Some(lower), Some(upper)) => {
                lower.value > upper.value
                    || (lower.value == upper.value
                        && (lower.operation.is_strict() || upper.operation.is_strict()))
            }
            _ => false,
        });
        if empty {
            return None;
        }
    }

    // Each subject's surviving bounds replace its first bound condition,
    // lower before upper; the other bound conditions are dropped.
    let mut folded = Vec::with_capacity(children.len());
    for child in children {
        match numeric_bound(&child) {
            Some((subject, _)) => {
                if let Some(entry) = bounds.remove(&subject) {
                    folded.extend(entry.lower.map(|bound| bound.to_expr(subject)));
                    folded.extend(entry.upper.map(|bound| bound.to_expr(subject)));
                }
            }
            None => folded.push(child),
        }
    }
    Some(folded)
}
