//! Triage - compiles draw.io medical questionnaires into logic graphs.
//!
//! A questionnaire drawn in draw.io is read into a typed diagram, checked,
//! simplified to questions connected by conditional edges, and given the
//! condition under which every question is shown. The result serializes to
//! JSON.

pub mod config;
pub mod logic;
pub mod simplify;

mod error;
mod export;

pub use triage_core::{identifier, semantic};
pub use triage_parser::{error as diagnostics, validate};

pub use error::TriageError;
pub use export::Questionnaire;

use log::{debug, info, trace, warn};

use triage_parser::ParseConfig;

use config::AppConfig;
use logic::{NodeLogic, derive_node_logic};
use simplify::{PassContext, Simplifier};
use validate::{Phase, Validated, Validator, validate_diagram};

/// Builder for compiling draw.io questionnaires.
///
/// This provides an API for processing questionnaires through the parsing,
/// simplification and logic stages.
///
/// # Examples
///
/// ```rust,no_run
/// use triage::{QuestionnaireBuilder, config::AppConfig};
///
/// let xml = std::fs::read_to_string("intake.drawio").expect("readable file");
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = QuestionnaireBuilder::new(config);
///
/// // Compile the document
/// let questionnaire = builder.compile(&xml)
///     .expect("Failed to compile");
///
/// // Export as JSON
/// let json = questionnaire.to_json()
///     .expect("Failed to export");
///
/// // Or use default config
/// let builder = QuestionnaireBuilder::default();
/// ```
#[derive(Default)]
pub struct QuestionnaireBuilder {
    config: AppConfig,
    page: Option<String>,
}

impl QuestionnaireBuilder {
    /// Create a new questionnaire builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including validation and simplifier settings
    pub fn new(config: AppConfig) -> Self {
        Self { config, page: None }
    }

    /// Selects the page to compile by id or name; the first page is used
    /// otherwise.
    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page;
        self
    }

    /// Parse a draw.io document into a validated diagram.
    ///
    /// # Arguments
    ///
    /// * `xml` - The draw.io document text
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Parse` when the document cannot be read or the
    /// validation level aborts on a finding.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use triage::QuestionnaireBuilder;
    ///
    /// let xml = std::fs::read_to_string("intake.drawio").expect("readable file");
    /// let diagram = QuestionnaireBuilder::default().parse(&xml)
    ///     .expect("Failed to parse questionnaire");
    /// println!("{} nodes", diagram.value().nodes_count());
    /// ```
    pub fn parse(&self, xml: &str) -> Result<Validated<semantic::Diagram>, TriageError> {
        info!("Parsing questionnaire");

        let diagram = triage_parser::parse(xml, &self.parse_config())
            .map_err(|err| TriageError::new_parse_error(err, xml))?;

        debug!(findings = diagram.findings().len(); "Questionnaire parsed successfully");
        trace!(diagram:? = diagram.value(); "Parsed diagram");

        Ok(diagram)
    }

    /// Simplify a parsed diagram to a fixed point and validate the result.
    ///
    /// Findings of `diagram` are carried over to the result.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Parse` when the validation level aborts on a
    /// finding. The error carries no document text.
    pub fn simplify(
        &self,
        diagram: Validated<semantic::Diagram>,
    ) -> Result<Validated<semantic::Diagram>, TriageError> {
        self.simplify_diagram(diagram)
            .map_err(|err| TriageError::new_parse_error(err, String::new()))
    }

    /// Compile a draw.io document into a questionnaire.
    ///
    /// This parses, simplifies and derives the logic of every node. A cycle
    /// left after simplification is logged and leaves node logic empty.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::Parse` with the document text when any stage
    /// aborts.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use triage::{QuestionnaireBuilder, config::AppConfig};
    ///
    /// let xml = std::fs::read_to_string("intake.drawio").expect("readable file");
    /// let builder = QuestionnaireBuilder::new(AppConfig::default());
    ///
    /// let questionnaire = builder.compile(&xml)
    ///     .expect("Failed to compile questionnaire");
    ///
    /// for finding in questionnaire.findings() {
    ///     println!("{finding}");
    /// }
    /// ```
    pub fn compile(&self, xml: &str) -> Result<Questionnaire, TriageError> {
        let parsed = self.parse(xml)?;
        let simplified = self
            .simplify_diagram(parsed)
            .map_err(|err| TriageError::new_parse_error(err, xml))?;
        let (diagram, findings) = simplified.into_parts();

        let logic = match derive_node_logic(&diagram) {
            Ok(logic) => logic,
            Err(cycle) => {
                warn!(node:% = cycle.node; "Questionnaire has a cycle, node logic left empty");
                NodeLogic::new()
            }
        };

        info!(
            nodes = diagram.nodes_count(),
            edges = diagram.edges().len(),
            findings = findings.len();
            "Questionnaire compiled"
        );
        Ok(Questionnaire::new(diagram, logic, findings))
    }

    fn parse_config(&self) -> ParseConfig {
        let validation = self.config.validation();
        ParseConfig::new()
            .with_level(validation.level())
            .with_entry(validation.entry().map(str::to_string))
            .with_page(self.page.clone())
    }

    fn simplify_diagram(
        &self,
        diagram: Validated<semantic::Diagram>,
    ) -> Result<Validated<semantic::Diagram>, triage_parser::ParseError> {
        let parse_config = self.parse_config();
        let (diagram, findings) = diagram.into_parts();
        let mut validator = Validator::with_findings(parse_config.level(), findings);

        info!(
            max_iterations = self.config.simplify().max_iterations();
            "Simplifying questionnaire"
        );
        let simplified = {
            let mut cx = PassContext::new(&mut validator, self.config.externals());
            Simplifier::new(self.config.simplify().max_iterations()).run(&diagram, &mut cx)?
        };

        validate_diagram(
            &simplified,
            parse_config.entry(),
            Phase::Simplified,
            &mut validator,
        )?;

        debug!(
            nodes_before = diagram.nodes_count(),
            nodes_after = simplified.nodes_count();
            "Questionnaire simplified"
        );
        Ok(validator.finish(simplified))
    }
}
