//! Shape classification of draw.io cells.
//!
//! draw.io encodes the shape of a vertex in its style, either as a bare flag
//! (`rhombus;`) or through `shape=` (`shape=hexagon;`). [`ShapeTag::classify`]
//! maps a cell onto the closed set of shapes the questionnaire notation uses,
//! and [`ColorClass`] buckets the fill colour that refines plain rectangles.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use indexmap::IndexMap;

use crate::style::Style;

/// Shape of a vertex cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    Rhombus,
    Hexagon,
    Ellipse,
    Callout,
    OffPageConnector,
    /// Rounded list container.
    SelectOne,
    /// Sharp list container.
    SelectMultiple,
    /// Fallback for every vertex that matches no other tag.
    Rectangle,
}

impl ShapeTag {
    /// Tags that can appear in a style string, in match priority order.
    ///
    /// `SelectOne`, `SelectMultiple` and `Rectangle` are never written as
    /// `shape=` values and are absent here.
    pub const STYLE_ENCODED: [ShapeTag; 5] = [
        ShapeTag::Rhombus,
        ShapeTag::Hexagon,
        ShapeTag::Ellipse,
        ShapeTag::Callout,
        ShapeTag::OffPageConnector,
    ];

    /// Name of the tag as written in draw.io styles.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeTag::Rhombus => "rhombus",
            ShapeTag::Hexagon => "hexagon",
            ShapeTag::Ellipse => "ellipse",
            ShapeTag::Callout => "callout",
            ShapeTag::OffPageConnector => "offPageConnector",
            ShapeTag::SelectOne => "select_one",
            ShapeTag::SelectMultiple => "select_multiple",
            ShapeTag::Rectangle => "rectangle",
        }
    }

    /// Classifies a cell from its attributes and parsed style.
    ///
    /// List containers classify as [`ShapeTag::SelectOne`] (rounded) or
    /// [`ShapeTag::SelectMultiple`] (sharp). Otherwise the style-encoded tags
    /// are tried in priority order: a tag matches when it is a style key or
    /// the value of `shape`. The first match wins; no match yields
    /// [`ShapeTag::Rectangle`].
    ///
    /// # Examples
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use triage_core::{shape::ShapeTag, style::Style};
    ///
    /// let attributes = IndexMap::new();
    /// let style = Style::parse("shape=hexagon;perimeter=hexagonPerimeter2");
    /// assert_eq!(ShapeTag::classify(&attributes, &style), ShapeTag::Hexagon);
    /// ```
    pub fn classify(attributes: &IndexMap<String, String>, style: &Style) -> ShapeTag {
        if is_list(attributes, style) {
            return if style.is_rounded() {
                ShapeTag::SelectOne
            } else {
                ShapeTag::SelectMultiple
            };
        }

        let shape = style.get("shape");
        Self::STYLE_ENCODED
            .into_iter()
            .find(|tag| style.contains(tag.as_str()) || shape == Some(tag.as_str()))
            .unwrap_or(ShapeTag::Rectangle)
    }
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_swimlane_vertex(attributes: &IndexMap<String, String>, style: &Style) -> bool {
    attributes.get("vertex").map(String::as_str) == Some("1") && style.contains("swimlane")
}

/// A group container: a swimlane vertex without a child layout.
pub fn is_group(attributes: &IndexMap<String, String>, style: &Style) -> bool {
    is_swimlane_vertex(attributes, style) && !style.contains("childLayout")
}

/// A list container: a swimlane vertex that stacks its children.
pub fn is_list(attributes: &IndexMap<String, String>, style: &Style) -> bool {
    is_swimlane_vertex(attributes, style) && style.get("childLayout") == Some("stackLayout")
}

/// Named bucket of a fill colour.
///
/// Rounded rectangles use the bucket to pick a diagnosis severity; green and
/// grey rectangles without incoming edges are help and hint boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Red,
    Green,
    Yellow,
    Orange,
    Grey,
}

impl ColorClass {
    /// Buckets an 8-bit RGB triple. Returns `None` for colours outside every range.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Option<Self> {
        let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));

        if r > 180 && g < 100 && b < 100 {
            return Some(ColorClass::Red);
        }
        if r < 150 && g > 150 && b < 150 {
            return Some(ColorClass::Green);
        }
        if r > 180 && g > 180 && b < 100 {
            return Some(ColorClass::Yellow);
        }
        if r > 180 && g > 100 && g < 180 && b < 100 {
            return Some(ColorClass::Orange);
        }

        // White is the default fill and never marks a hint.
        let is_white = r >= 250 && g >= 250 && b >= 250;
        let mean = (r + g + b) as f64 / 3.0;
        let near_mean = [r, g, b]
            .iter()
            .all(|channel| (f64::from(*channel) - mean).abs() <= 10.0);
        if near_mean && !is_white {
            return Some(ColorClass::Grey);
        }

        None
    }

    /// Buckets the `fillColor` of a style.
    ///
    /// Any CSS colour syntax understood by the `color` crate is accepted;
    /// `none` and unparsable values yield `None`.
    pub fn of_style(style: &Style) -> Option<Self> {
        let raw = style.fill_color()?.trim();
        if raw.eq_ignore_ascii_case("none") {
            return None;
        }
        let color = DynamicColor::from_str(raw).ok()?;
        let rgba = color.to_alpha_color::<Srgb>().to_rgba8();
        if rgba.a == 0 {
            return None;
        }
        Self::from_rgb(rgba.r, rgba.g, rgba.b)
    }
}
