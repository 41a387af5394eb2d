//! Reader for uncompressed draw.io documents.
//!
//! A `.drawio` file is an `mxfile` holding one `diagram` per page; each page
//! holds an `mxGraphModel` whose `root` lists the cells. Exported models may
//! also appear on their own, with `mxGraphModel` as the document element.
//!
//! Cells carrying custom properties are wrapped in a `UserObject` (or
//! `object`) element that owns the id, the label and the properties, while
//! the inner `mxCell` owns the style, parent and endpoints. The reader merges
//! both into one [`Cell`].
//!
//! Compressed pages are not inflated; they are reported as critical.

use log::debug;
use roxmltree::Node as XmlNode;

use triage_core::{
    cell::{Cell, Geometry},
    style::Style,
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    validate::Validator,
};

/// Attributes of `mxCell` that [`Cell`] keeps in typed fields.
const LIFTED_ATTRIBUTES: [&str; 5] = ["id", "style", "parent", "source", "target"];

/// One page of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    id: String,
    name: String,
    cells: Vec<Cell>,
}

impl Page {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// The pages of a draw.io document, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The page whose id or name is `selector`, or the first page when no
    /// selector is given.
    pub fn page(&self, selector: Option<&str>) -> Option<&Page> {
        match selector {
            Some(selector) => self
                .pages
                .iter()
                .find(|page| page.id == selector || page.name == selector),
            None => self.pages.first(),
        }
    }
}

/// Reads every page of a draw.io document.
///
/// # Errors
///
/// Structural failures are critical and always abort: text that is not XML,
/// a document without pages, a page without a graph model or a model without
/// a `root`, and compressed pages. Malformed cells are reported as errors and
/// skipped when the policy allows it.
pub fn read_document(xml: &str, validator: &mut Validator) -> Result<Document, ParseError> {
    let document = roxmltree::Document::parse(xml).map_err(|err| {
        validator.abort(
            Diagnostic::critical(format!("document is not valid XML: {err}"))
                .with_code(ErrorCode::E001),
        )
    })?;

    let root = document.root_element();
    let pages = match root.tag_name().name() {
        "mxfile" => read_pages(root, validator)?,
        "mxGraphModel" => vec![Page {
            id: "page-1".to_string(),
            name: "Page-1".to_string(),
            cells: read_model(root, "page-1", validator)?,
        }],
        other => {
            return Err(validator.abort(
                Diagnostic::critical(format!(
                    "expected an `mxfile` or `mxGraphModel` document, found `{other}`"
                ))
                .with_code(ErrorCode::E002),
            ));
        }
    };

    if pages.is_empty() {
        return Err(validator.abort(
            Diagnostic::critical("document has no pages").with_code(ErrorCode::E004),
        ));
    }

    debug!(pages = pages.len(); "Read draw.io document");
    Ok(Document { pages })
}

fn child_element<'a, 'input>(node: XmlNode<'a, 'input>, tag: &str) -> Option<XmlNode<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn read_pages(mxfile: XmlNode<'_, '_>, validator: &mut Validator) -> Result<Vec<Page>, ParseError> {
    let diagrams = mxfile
        .children()
        .filter(|child| child.is_element() && child.tag_name().name() == "diagram");

    let mut pages = Vec::new();
    for (index, diagram) in diagrams.enumerate() {
        let id = diagram
            .attribute("id")
            .map_or_else(|| format!("page-{}", index + 1), str::to_string);
        let name = diagram
            .attribute("name")
            .map_or_else(|| id.clone(), str::to_string);

        let Some(model) = child_element(diagram, "mxGraphModel") else {
            let payload = diagram.text().map(str::trim).unwrap_or_default();
            let diagnostic = if payload.is_empty() {
                Diagnostic::critical(format!("page `{name}` has no `mxGraphModel`"))
                    .with_code(ErrorCode::E002)
            } else {
                Diagnostic::critical(format!("page `{name}` is stored compressed"))
                    .with_code(ErrorCode::E003)
                    .with_help(
                        "in draw.io, turn off File > Properties > Compressed and save again",
                    )
            };
            return Err(validator.abort(diagnostic));
        };

        let cells = read_model(model, &id, validator)?;
        pages.push(Page { id, name, cells });
    }
    Ok(pages)
}

fn read_model(
    model: XmlNode<'_, '_>,
    page_id: &str,
    validator: &mut Validator,
) -> Result<Vec<Cell>, ParseError> {
    let Some(root) = child_element(model, "root") else {
        return Err(validator.abort(
            Diagnostic::critical(format!("graph model of page `{page_id}` has no `root`"))
                .with_code(ErrorCode::E002),
        ));
    };

    let mut cells = Vec::new();
    for element in root.children().filter(XmlNode::is_element) {
        let cell = match element.tag_name().name() {
            "mxCell" => read_cell(element, None, validator)?,
            "UserObject" | "object" => match child_element(element, "mxCell") {
                Some(inner) => read_cell(inner, Some(element), validator)?,
                None => {
                    validator.report(
                        Diagnostic::error(format!(
                            "`{}` wraps no `mxCell`",
                            element.tag_name().name()
                        ))
                        .with_code(ErrorCode::E104),
                    )?;
                    None
                }
            },
            _ => None,
        };
        cells.extend(cell);
    }

    debug!(page = page_id, cells = cells.len(); "Read page");
    Ok(cells)
}

fn read_cell<'a, 'input>(
    cell: XmlNode<'a, 'input>,
    wrapper: Option<XmlNode<'a, 'input>>,
    validator: &mut Validator,
) -> Result<Option<Cell>, ParseError> {
    let id = wrapper
        .and_then(|wrapper| wrapper.attribute("id"))
        .or_else(|| cell.attribute("id"));
    let Some(id) = id else {
        validator.report(Diagnostic::error("cell has no `id`").with_code(ErrorCode::E104))?;
        return Ok(None);
    };

    let mut record = Cell::new(id).with_style(Style::parse(cell.attribute("style").unwrap_or_default()));

    let wrapper_attributes = wrapper
        .into_iter()
        .flat_map(|wrapper| wrapper.attributes())
        .filter(|attribute| attribute.name() != "id");
    let cell_attributes = cell
        .attributes()
        .filter(|attribute| !LIFTED_ATTRIBUTES.contains(&attribute.name()));
    for attribute in wrapper_attributes.chain(cell_attributes) {
        if record.attribute(attribute.name()).is_none() {
            record = record.with_attribute(attribute.name(), attribute.value());
        }
    }

    if let Some(parent) = cell.attribute("parent") {
        record = record.with_parent(parent);
    }
    if let Some(source) = cell.attribute("source") {
        record = record.with_source(source);
    }
    if let Some(target) = cell.attribute("target") {
        record = record.with_target(target);
    }
    if let Some(geometry) = child_element(cell, "mxGeometry") {
        record = record.with_geometry(read_geometry(geometry));
    }

    Ok(Some(record))
}

/// Missing coordinates are zero; unreadable ones are `NaN`.
fn read_geometry(geometry: XmlNode<'_, '_>) -> Geometry {
    let read = |name: &str| {
        geometry
            .attribute(name)
            .map_or(0.0, |raw| raw.trim().parse().unwrap_or(f64::NAN))
    };
    Geometry::new(read("x"), read("y"), read("width"), read("height"))
}
