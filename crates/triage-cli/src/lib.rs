//! Triage CLI library
//!
//! This module contains the core CLI logic for the Triage questionnaire
//! compiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use triage::{Questionnaire, QuestionnaireBuilder, TriageError};

/// Run the Triage CLI application
///
/// This function compiles the input draw.io file and writes the resulting
/// questionnaire as JSON to the output file. Findings that did not stop the
/// run are logged as warnings and kept in the output.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `TriageError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing and validation errors
/// - Export errors
pub fn run(args: &Args) -> Result<Questionnaire, TriageError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing questionnaire"
    );

    // Load configuration
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(level) = args.level {
        app_config = app_config.with_level(level);
    }

    // Read input file
    let xml = fs::read_to_string(&args.input)?;

    // Compile using the QuestionnaireBuilder API
    let builder = QuestionnaireBuilder::new(app_config).with_page(args.page.clone());
    let questionnaire = builder.compile(&xml)?;

    for finding in questionnaire.findings() {
        warn!(finding:%; "Finding recorded");
    }

    // Write output file
    fs::write(&args.output, questionnaire.to_json()?)?;

    info!(
        output_file = args.output,
        findings = questionnaire.findings().len();
        "Questionnaire exported successfully"
    );

    Ok(questionnaire)
}
