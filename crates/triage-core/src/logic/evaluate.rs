//! Evaluation of expressions against a set of answers.

use std::collections::{HashMap, HashSet};

use crate::{
    identifier::Id,
    logic::{
        Comparison, Connective, LogicExpr, Subject, Value,
        expr::numbers_equal,
    },
};

/// A patient's answer to one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Selected options of a multiple-choice question.
    Choices(Vec<String>),
}

/// Answers given so far, plus the flags raised on the way.
#[derive(Debug, Clone, Default)]
pub struct Answers {
    values: HashMap<Id, Answer>,
    flags: HashSet<String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, subject: Id, answer: Answer) -> Self {
        self.values.insert(subject, answer);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn answer(&self, subject: Id) -> Option<&Answer> {
        self.values.get(&subject)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

impl LogicExpr {
    /// Evaluates the expression.
    ///
    /// A condition on a question that has no answer is false, whatever its
    /// operator. A `NOT` with other than one child negates the conjunction
    /// of its children.
    pub fn evaluate(&self, answers: &Answers) -> bool {
        match self {
            LogicExpr::Condition {
                subject: Subject::Flags,
                operation,
                value,
            } => evaluate_flags(*operation, value, answers),
            LogicExpr::Condition {
                subject: Subject::Node(id),
                operation,
                value,
            } => answers
                .answer(*id)
                .is_some_and(|answer| evaluate_answer(answer, *operation, value)),
            LogicExpr::Operator {
                operation: Connective::And,
                children,
            } => children.iter().all(|child| child.evaluate(answers)),
            LogicExpr::Operator {
                operation: Connective::Or,
                children,
            } => children.iter().any(|child| child.evaluate(answers)),
            LogicExpr::Operator {
                operation: Connective::Not,
                children,
            } => !children.iter().all(|child| child.evaluate(answers)),
        }
    }
}

fn evaluate_flags(operation: Comparison, value: &Value, answers: &Answers) -> bool {
    let Value::Text(flag) = value else {
        return false;
    };
    match operation {
        Comparison::In | Comparison::Eq => answers.has_flag(flag),
        Comparison::Ne => !answers.has_flag(flag),
        _ => false,
    }
}

fn evaluate_answer(answer: &Answer, operation: Comparison, value: &Value) -> bool {
    match operation {
        Comparison::Eq => answer_equals(answer, value),
        Comparison::Ne => !answer_equals(answer, value),
        Comparison::In => match (answer, value) {
            (Answer::Choices(choices), Value::Text(option)) => choices.contains(option),
            (Answer::Text(text), Value::Text(option)) => text == option,
            _ => false,
        },
        Comparison::Gt | Comparison::Ge | Comparison::Lt | Comparison::Le => {
            let (Answer::Number(answer), Value::Number(bound)) = (answer, value) else {
                return false;
            };
            match operation {
                Comparison::Gt => answer > bound,
                Comparison::Ge => answer >= bound,
                Comparison::Lt => answer < bound,
                _ => answer <= bound,
            }
        }
    }
}

fn answer_equals(answer: &Answer, value: &Value) -> bool {
    match (answer, value) {
        (Answer::Bool(answer), Value::Bool(value)) => answer == value,
        (Answer::Number(answer), Value::Number(value)) => numbers_equal(*answer, *value),
        (Answer::Text(answer), Value::Text(value)) => answer == value,
        (Answer::Choices(choices), Value::Text(value)) => {
            matches!(choices.as_slice(), [only] if only == value)
        }
        _ => false,
    }
}
