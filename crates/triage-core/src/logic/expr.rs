//! The expression tree and its leaves.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::identifier::Id;

/// Relative tolerance used when numbers are compared for equality.
///
/// Two numbers are equal when `|a - b| <= NUMERIC_TOLERANCE * max(1, |a|, |b|)`.
/// Ordering comparisons (`<`, `>=`, ...) are exact.
pub const NUMERIC_TOLERANCE: f64 = 1e-9;

/// What a condition tests: the answer to a node, or the set of raised flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Node(Id),
    Flags,
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Subject::Node(id) => id.serialize(serializer),
            Subject::Flags => serializer.serialize_str("flags"),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Node(id) => write!(f, "{id}"),
            Subject::Flags => f.write_str("flags"),
        }
    }
}

impl From<Id> for Subject {
    fn from(id: Id) -> Self {
        Subject::Node(id)
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparison {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "in")]
    In,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Ne => "!=",
            Comparison::In => "in",
        }
    }

    /// Parses an operator token. `==` is accepted as `=`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "=" | "==" => Some(Comparison::Eq),
            ">" => Some(Comparison::Gt),
            "<" => Some(Comparison::Lt),
            ">=" => Some(Comparison::Ge),
            "<=" => Some(Comparison::Le),
            "!=" => Some(Comparison::Ne),
            "in" => Some(Comparison::In),
            _ => None,
        }
    }

    /// The complementary comparison on an answered subject.
    ///
    /// `in` has no complement in the operator set and yields `None`.
    pub fn negate(&self) -> Option<Self> {
        match self {
            Comparison::Eq => Some(Comparison::Ne),
            Comparison::Ne => Some(Comparison::Eq),
            Comparison::Gt => Some(Comparison::Le),
            Comparison::Le => Some(Comparison::Gt),
            Comparison::Lt => Some(Comparison::Ge),
            Comparison::Ge => Some(Comparison::Lt),
            Comparison::In => None,
        }
    }

    /// `>` and `>=`.
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, Comparison::Gt | Comparison::Ge)
    }

    /// `<` and `<=`.
    pub fn is_upper_bound(&self) -> bool {
        matches!(self, Comparison::Lt | Comparison::Le)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Comparison::Gt | Comparison::Lt)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal a condition compares against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Equality with [`NUMERIC_TOLERANCE`] applied to numbers.
    pub fn approx_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b),
            _ => self == other,
        }
    }
}

pub(crate) fn numbers_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= NUMERIC_TOLERANCE * 1f64.max(a.abs()).max(b.abs())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Boolean connective of an operator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    And,
    Or,
    Not,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => f.write_str("AND"),
            Connective::Or => f.write_str("OR"),
            Connective::Not => f.write_str("NOT"),
        }
    }
}

/// A condition/operator expression tree.
///
/// Serializes as `{"type": "condition", "subject", "operation", "value"}` or
/// `{"type": "operator", "operation", "children"}`.
///
/// # Examples
///
/// ```
/// use triage_core::{identifier::Id, logic::{Comparison, LogicExpr}};
///
/// let age = Id::new("age");
/// let expr = LogicExpr::and(vec![
///     LogicExpr::condition(age, Comparison::Gt, 5.0),
///     LogicExpr::condition(age, Comparison::Gt, 10.0),
/// ]);
///
/// assert_eq!(expr.simplify(), LogicExpr::condition(age, Comparison::Gt, 10.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogicExpr {
    Condition {
        subject: Subject,
        operation: Comparison,
        value: Value,
    },
    Operator {
        operation: Connective,
        children: Vec<LogicExpr>,
    },
}

impl LogicExpr {
    pub fn condition(
        subject: impl Into<Subject>,
        operation: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        LogicExpr::Condition {
            subject: subject.into(),
            operation,
            value: value.into(),
        }
    }

    pub fn and(children: Vec<LogicExpr>) -> Self {
        LogicExpr::Operator {
            operation: Connective::And,
            children,
        }
    }

    pub fn or(children: Vec<LogicExpr>) -> Self {
        LogicExpr::Operator {
            operation: Connective::Or,
            children,
        }
    }

    pub fn not(child: LogicExpr) -> Self {
        LogicExpr::Operator {
            operation: Connective::Not,
            children: vec![child],
        }
    }

    /// Literal true, the empty conjunction.
    pub fn always() -> Self {
        Self::and(Vec::new())
    }

    /// Literal false, the empty disjunction.
    pub fn never() -> Self {
        Self::or(Vec::new())
    }

    pub fn is_always(&self) -> bool {
        matches!(self, LogicExpr::Operator { operation: Connective::And, children } if children.is_empty())
    }

    pub fn is_never(&self) -> bool {
        matches!(self, LogicExpr::Operator { operation: Connective::Or, children } if children.is_empty())
    }

    /// Conjoins two optional expressions, omitting absent operands.
    ///
    /// Returns `None` only when both operands are absent. The result is
    /// simplified.
    pub fn conjoin(left: Option<&LogicExpr>, right: Option<&LogicExpr>) -> Option<LogicExpr> {
        match (left, right) {
            (None, None) => None,
            (Some(expr), None) | (None, Some(expr)) => Some(expr.simplify()),
            (Some(left), Some(right)) => {
                Some(LogicExpr::and(vec![left.clone(), right.clone()]).simplify())
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            LogicExpr::Condition { .. } => 1,
            LogicExpr::Operator { children, .. } => {
                1 + children.iter().map(LogicExpr::size).sum::<usize>()
            }
        }
    }
}

impl fmt::Display for LogicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicExpr::Condition {
                subject,
                operation,
                value,
            } => write!(f, "{subject} {operation} {value}"),
            _ if self.is_always() => f.write_str("true"),
            _ if self.is_never() => f.write_str("false"),
            LogicExpr::Operator {
                operation,
                children,
            } => {
                write!(f, "{operation}(")?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_comparison_negate() {
        assert_eq!(Comparison::Eq.negate(), Some(Comparison::Ne));
        assert_eq!(Comparison::Gt.negate(), Some(Comparison::Le));
        assert_eq!(Comparison::Lt.negate(), Some(Comparison::Ge));
        assert_eq!(Comparison::Ge.negate(), Some(Comparison::Lt));
        assert_eq!(Comparison::In.negate(), None);
    }

    #[test]
    fn test_comparison_parse() {
        assert_eq!(Comparison::parse("=="), Some(Comparison::Eq));
        assert_eq!(Comparison::parse(">="), Some(Comparison::Ge));
        assert_eq!(Comparison::parse("=>"), None);
    }

    #[test]
    fn test_constants() {
        assert!(LogicExpr::always().is_always());
        assert!(LogicExpr::never().is_never());
        assert!(!LogicExpr::always().is_never());
        assert_eq!(LogicExpr::always().to_string(), "true");
        assert_eq!(LogicExpr::never().to_string(), "false");
    }

    #[test]
    fn test_display() {
        let age = Id::new("age");
        let symptoms = Id::new("symptoms");
        let expr = LogicExpr::or(vec![
            LogicExpr::condition(age, Comparison::Ge, 18.0),
            LogicExpr::condition(symptoms, Comparison::In, "Fever"),
        ]);
        assert_eq!(expr.to_string(), "OR(age >= 18, symptoms in \"Fever\")");
    }

    #[test]
    fn test_conjoin_omits_absent() {
        let cond = LogicExpr::condition(Id::new("q"), Comparison::Eq, true);
        assert_eq!(LogicExpr::conjoin(None, None), None);
        assert_eq!(LogicExpr::conjoin(Some(&cond), None), Some(cond.clone()));
        assert_eq!(LogicExpr::conjoin(None, Some(&cond)), Some(cond.clone()));
        assert_eq!(
            LogicExpr::conjoin(Some(&cond), Some(&cond)),
            Some(cond.clone())
        );
    }

    #[test]
    fn test_numbers_equal_tolerance() {
        assert!(numbers_equal(0.1 + 0.2, 0.3));
        assert!(numbers_equal(1e12, 1e12 + 1e-1));
        assert!(!numbers_equal(1.0, 1.0001));
        assert!(Value::Number(2.0).approx_eq(&Value::Number(2.0 + 1e-12)));
        assert!(!Value::Number(2.0).approx_eq(&Value::text("2")));
    }

    #[test]
    fn test_value_as_number() {
        assert_approx_eq!(f64, Value::from(38.5).as_number().unwrap(), 38.5);
        assert_approx_eq!(f64, Value::from(-0.25).as_number().unwrap(), -0.25);
        assert_eq!(Value::text("38.5").as_number(), None);
        assert_eq!(Value::from(true).as_number(), None);
    }

    #[test]
    fn test_size() {
        let cond = LogicExpr::condition(Id::new("q"), Comparison::Eq, true);
        assert_eq!(cond.size(), 1);
        assert_eq!(LogicExpr::not(cond.clone()).size(), 2);
        assert_eq!(LogicExpr::and(vec![cond.clone(), cond]).size(), 3);
    }
}
