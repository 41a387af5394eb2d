//! draw.io style strings.
//!
//! A draw.io style is a `;`-separated list of `key=value` tokens, where a bare
//! `key` acts as a boolean flag (`rhombus;whiteSpace=wrap;`). [`Style`] keeps
//! the tokens in document order so unknown keys survive untouched.

use indexmap::IndexMap;
use serde::Serialize;

/// Parsed style of a cell.
///
/// # Examples
///
/// ```
/// use triage_core::style::Style;
///
/// let style = Style::parse("rounded=1;whiteSpace=wrap;fillColor=#fff");
/// assert_eq!(style.get("rounded"), Some("1"));
/// assert_eq!(style.get("fillColor"), Some("#fff"));
/// assert!(style.is_rounded());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Style {
    entries: IndexMap<String, String>,
}

impl Style {
    /// Parses a raw style string. Never fails.
    ///
    /// Empty tokens are skipped. A token is split on its first `=`; a token
    /// without `=` maps to itself.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (token.to_string(), token.to_string()),
            })
            .collect();
        Self { entries }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `rounded=1`
    pub fn is_rounded(&self) -> bool {
        self.get("rounded") == Some("1")
    }

    pub fn fill_color(&self) -> Option<&str> {
        self.get("fillColor")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<&str> for Style {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
