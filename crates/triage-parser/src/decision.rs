//! Parsing of decision-point labels.
//!
//! A decision point on a numeric question spells out its test in the label,
//! e.g. `Temperature >= 38.5`. A decision point on a list question names the
//! option it tests in brackets, e.g. `Symptom is [Fever]?`. Both forms may be
//! surrounded by free text, so the parsers here search the label for the
//! first place where the pattern matches.

use winnow::{
    Parser as _,
    ascii::{digit1, multispace0},
    combinator::{alt, delimited, opt, preceded},
    error::ModalResult,
    token::take_until,
};

use triage_core::logic::Comparison;

type Input<'a> = &'a str;

/// `==`, `!=`, `>=`, `<=`, `>`, `<` or `=`; longer operators are tried first.
fn comparison(input: &mut Input<'_>) -> ModalResult<Comparison> {
    alt(("==", "!=", ">=", "<=", ">", "<", "="))
        .verify_map(Comparison::parse)
        .parse_next(input)
}

/// An optionally negative decimal: `-?\d+(\.\d+)?`.
fn number(input: &mut Input<'_>) -> ModalResult<f64> {
    (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)
}

fn numeric_condition(input: &mut Input<'_>) -> ModalResult<(Comparison, f64)> {
    (comparison, preceded(multispace0, number)).parse_next(input)
}

fn bracketed<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    delimited('[', take_until(0.., ']'), ']').parse_next(input)
}

/// Runs `parser` at every character boundary of `label` and returns the
/// first match.
fn search<'a, O>(
    label: &'a str,
    mut parser: impl FnMut(&mut Input<'a>) -> ModalResult<O>,
) -> Option<O> {
    label.char_indices().find_map(|(offset, _)| {
        let mut input = &label[offset..];
        parser(&mut input).ok()
    })
}

/// Finds the first `operator number` comparison in a label.
///
/// `==` is read as `=`.
///
/// # Examples
///
/// ```
/// use triage_core::logic::Comparison;
/// use triage_parser::decision::parse_numeric_condition;
///
/// assert_eq!(
///     parse_numeric_condition("Age >= 18?"),
///     Some((Comparison::Ge, 18.0))
/// );
/// assert_eq!(parse_numeric_condition("Is the patient an adult?"), None);
/// ```
pub fn parse_numeric_condition(label: &str) -> Option<(Comparison, f64)> {
    search(label, numeric_condition)
}

/// Finds the first option written in brackets, trimmed. Empty brackets do not
/// name an option.
pub fn parse_bracketed_option(label: &str) -> Option<&str> {
    search(label, bracketed)
        .map(str::trim)
        .filter(|option| !option.is_empty())
}
