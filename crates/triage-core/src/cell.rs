//! Raw cell records read from a draw.io page.
//!
//! A [`Cell`] is the flat, untyped view of one `mxCell`: every vertex, edge,
//! group and layer of the page is a cell. The diagram builder turns a page of
//! cells into a typed [`Diagram`](crate::semantic::Diagram).

use indexmap::IndexMap;
use serde::Serialize;

use crate::{identifier::Id, style::Style};

/// Position and size of a cell as stored in its `mxGeometry`.
///
/// Values that could not be read are carried as `NaN` so that validation can
/// report them instead of the reader guessing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` when every coordinate is finite and the size is not negative.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// One cell of a draw.io page.
///
/// The attribute map holds every XML attribute of the cell (and of its
/// wrapping `UserObject`, when present) except the ones lifted into typed
/// fields: `id`, `style`, `parent`, `source` and `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: Id,
    attributes: IndexMap<String, String>,
    style: Style,
    geometry: Option<Geometry>,
    parent: Option<Id>,
    source: Option<Id>,
    target: Option<Id>,
}

impl Cell {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            attributes: IndexMap::new(),
            style: Style::default(),
            geometry: None,
            parent: None,
            source: None,
            target: None,
        }
    }

    /// Creates a vertex cell (`vertex="1"`) with the given label and style.
    pub fn vertex(id: impl Into<Id>, label: &str, style: &str) -> Self {
        Self::new(id)
            .with_attribute("vertex", "1")
            .with_attribute("value", label)
            .with_style(Style::parse(style))
    }

    /// Creates an edge cell (`edge="1"`) between `source` and `target`.
    pub fn edge(id: impl Into<Id>, source: impl Into<Id>, target: impl Into<Id>) -> Self {
        Self::new(id)
            .with_attribute("edge", "1")
            .with_source(source)
            .with_target(target)
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<Id>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<Id>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<Id>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn source(&self) -> Option<Id> {
        self.source
    }

    pub fn target(&self) -> Option<Id> {
        self.target
    }

    /// `vertex="1"`
    pub fn is_vertex(&self) -> bool {
        self.attribute("vertex") == Some("1")
    }

    /// `edge="1"`
    pub fn is_edge(&self) -> bool {
        self.attribute("edge") == Some("1")
    }

    /// Display text of the cell.
    ///
    /// `UserObject` wrappers store it under `label`, plain cells under
    /// `value`. Plain labels are taken as written. Labels of `html=1` cells
    /// have their tags removed, `<br>` turned into a newline and character
    /// references decoded.
    pub fn label(&self) -> String {
        let raw = self
            .attribute("label")
            .or_else(|| self.attribute("value"))
            .unwrap_or_default();
        if self.style.get("html") == Some("1") {
            html_text(raw)
        } else {
            raw.trim().to_string()
        }
    }
}

fn html_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match tag_len(candidate) {
            Some(len) => {
                if is_line_break(&candidate[..len]) {
                    text.push('\n');
                }
                rest = &candidate[len..];
            }
            // A bare `<` is text, as in `age < 5`.
            None => {
                text.push('<');
                rest = &candidate[1..];
            }
        }
    }
    text.push_str(rest);

    htmlize::unescape(text.as_str())
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Length of the tag opening `text`, which starts with `<`.
///
/// Only `<` followed by a letter, `/` or `!` opens a tag.
fn tag_len(text: &str) -> Option<usize> {
    let opens_tag = text[1..]
        .starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '/' || ch == '!');
    if !opens_tag {
        return None;
    }
    text.find('>').map(|end| end + 1)
}

fn is_line_break(tag: &str) -> bool {
    let name: String = tag[1..]
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .collect();
    name.eq_ignore_ascii_case("br")
}
