//! Condition expressions attached to edges and nodes.
//!
//! A [`LogicExpr`] is either a single comparison ([`LogicExpr::Condition`]) or
//! a connective over sub-expressions ([`LogicExpr::Operator`]). Expressions are
//! immutable values: [`LogicExpr::simplify`] returns a new tree.
//!
//! Constants are expressed inside the same two shapes: the empty conjunction
//! `AND[]` is true and the empty disjunction `OR[]` is false.

mod evaluate;
mod expr;
mod simplify;

pub use evaluate::{Answer, Answers};
pub use expr::{Comparison, Connective, LogicExpr, NUMERIC_TOLERANCE, Subject, Value};
