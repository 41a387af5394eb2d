//! Command-line argument definitions for the Triage CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, validation strictness, page selection, and logging verbosity.

use clap::Parser;

use triage_parser::validate::ValidationLevel;

/// Command-line arguments for the Triage questionnaire compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input draw.io file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Validation level (strict, normal, lenient); overrides the configuration
    #[arg(long)]
    pub level: Option<ValidationLevel>,

    /// Page to compile, by id or name; the first page by default
    #[arg(long)]
    pub page: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
