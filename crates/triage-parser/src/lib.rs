//! Triage Parser
//!
//! This crate turns a draw.io questionnaire into a validated [`Diagram`].
//!
//! # Pipeline
//!
//! ```text
//! draw.io XML → Reader → Cells → Builder (4 passes) → Diagram → Validation → Validated<Diagram>
//! ```
//!
//! 1. **Reader** ([`drawio`]): reads the pages of the document into cells.
//! 2. **Builder** ([`builder`]): resolves groups, lists, nodes and edges.
//! 3. **Validation** ([`validate`]): whole-diagram checks under the
//!    configured [`ValidationLevel`].
//!
//! Every finding that does not stop the run is returned alongside the
//! diagram.
//!
//! # Example
//!
//! ```
//! use triage_parser::{ParseConfig, parse};
//!
//! let xml = r#"<mxfile><diagram id="p1" name="Intake"><mxGraphModel><root>
//!   <mxCell id="0"/><mxCell id="1" parent="0"/>
//!   <mxCell id="q1" value="Fever?" vertex="1" parent="1"/>
//!   <mxCell id="q2" value="How high?" style="shape=hexagon;" vertex="1" parent="1"/>
//!   <mxCell id="e1" value="yes" edge="1" parent="1" source="q1" target="q2"/>
//! </root></mxGraphModel></diagram></mxfile>"#;
//!
//! let validated = parse(xml, &ParseConfig::default()).expect("valid questionnaire");
//! assert_eq!(validated.value().nodes_count(), 2);
//! assert!(validated.findings().is_empty());
//! ```

pub mod builder;
pub mod decision;
pub mod drawio;
pub mod error;
pub mod validate;

use log::info;

use triage_core::{cell::Cell, identifier::Id, semantic::Diagram};

use builder::DiagramBuilder;
use error::{Diagnostic, ErrorCode};
use validate::{Phase, Validated, ValidationLevel, Validator, validate_diagram};

pub use error::ParseError;

/// Options for [`parse`] and [`build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseConfig {
    level: ValidationLevel,
    entry: Option<String>,
    page: Option<String>,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: ValidationLevel) -> Self {
        self.level = level;
        self
    }

    /// Declares the entry node that reachability is checked from.
    pub fn with_entry(mut self, entry: Option<String>) -> Self {
        self.entry = entry;
        self
    }

    /// Selects a page by id or name; the first page is used otherwise.
    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page;
        self
    }

    pub fn level(&self) -> ValidationLevel {
        self.level
    }

    pub fn entry(&self) -> Option<Id> {
        self.entry.as_deref().map(Id::new)
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// Reads a draw.io document and builds the diagram of the selected page.
///
/// # Errors
///
/// Returns a [`ParseError`] with every finding recorded up to the one the
/// validation policy stopped on.
pub fn parse(xml: &str, config: &ParseConfig) -> Result<Validated<Diagram>, ParseError> {
    let mut validator = Validator::new(config.level());
    let document = drawio::read_document(xml, &mut validator)?;

    let Some(page) = document.page(config.page()) else {
        let selector = config.page().unwrap_or_default();
        return Err(validator.abort(
            Diagnostic::critical(format!("document has no page `{selector}`"))
                .with_code(ErrorCode::E004),
        ));
    };

    build_with(page.cells(), page.id(), config, validator)
}

/// Builds a diagram from the cells of one page.
///
/// # Errors
///
/// See [`parse`].
pub fn build(
    cells: &[Cell],
    page_id: &str,
    config: &ParseConfig,
) -> Result<Validated<Diagram>, ParseError> {
    build_with(cells, page_id, config, Validator::new(config.level()))
}

fn build_with(
    cells: &[Cell],
    page_id: &str,
    config: &ParseConfig,
    validator: Validator,
) -> Result<Validated<Diagram>, ParseError> {
    let (diagram, mut validator) = DiagramBuilder::new(page_id, validator)
        .resolve_groups(cells)?
        .resolve_lists(cells)?
        .resolve_nodes(cells)?
        .resolve_edges(cells)?
        .finish();

    validate_diagram(&diagram, config.entry(), Phase::Built, &mut validator)?;

    info!(
        page = page_id,
        nodes = diagram.nodes_count(),
        edges = diagram.edges().len(),
        findings = validator.findings().len();
        "Diagram built"
    );
    Ok(validator.finish(diagram))
}
