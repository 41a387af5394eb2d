//! Graph simplification.
//!
//! The [`Simplifier`] runs an ordered list of [`Pass`]es over a diagram,
//! round after round, until a whole round leaves the diagram unchanged or the
//! round limit is reached. Each pass takes the current diagram by reference
//! and returns a new one; nothing is rewritten in place.
//!
//! # Passes
//!
//! 1. [`ConsolidateTypes`]: settles node types from shape, colour and edges.
//! 2. [`FlattenOptions`]: replaces option nodes by conditions on their list.
//! 3. [`AssignEdgeLogic`]: gives every edge without logic its table logic.
//! 4. [`FoldGotos`]: routes edges through goto nodes directly to their target.
//! 5. [`EliminateDecisionPoints`]: replaces each decision point by edges that
//!    carry its condition.
//! 6. [`MergeNotes`]: joins chains of notes.
//! 7. [`FoldAnnotations`]: moves help and hint text onto the nodes they explain.
//! 8. [`AnnotateGroups`]: copies group labels onto their members.
//!
//! Edge logic is assigned inside the loop because structural rewrites change
//! which node an edge leaves from.

mod annotations;
mod consolidate;
mod decision;
mod edge_logic;
mod goto;
mod groups;
mod notes;
mod options;

pub use annotations::FoldAnnotations;
pub use consolidate::ConsolidateTypes;
pub use decision::EliminateDecisionPoints;
pub use edge_logic::AssignEdgeLogic;
pub use goto::FoldGotos;
pub use groups::AnnotateGroups;
pub use notes::MergeNotes;
pub use options::FlattenOptions;

use log::{debug, trace};

use triage_core::semantic::Diagram;
use triage_parser::{
    error::{Diagnostic, ErrorCode, ParseError},
    validate::Validator,
};

use crate::config::ExternalsConfig;

/// State shared by the passes of a run.
pub struct PassContext<'a> {
    validator: &'a mut Validator,
    externals: &'a ExternalsConfig,
    round: usize,
}

impl<'a> PassContext<'a> {
    pub fn new(validator: &'a mut Validator, externals: &'a ExternalsConfig) -> Self {
        Self {
            validator,
            externals,
            round: 1,
        }
    }

    pub fn externals(&self) -> &ExternalsConfig {
        self.externals
    }

    /// The simplifier round being run, starting at 1.
    pub fn round(&self) -> usize {
        self.round
    }

    pub(crate) fn set_round(&mut self, round: usize) {
        self.round = round;
    }

    /// Reports a finding to the validator of the run.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the validation policy aborts on it.
    pub fn report(&mut self, diagnostic: Diagnostic) -> Result<(), ParseError> {
        self.validator.report(diagnostic)
    }
}

/// One rewrite step of the simplifier.
pub trait Pass {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the rewritten diagram.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when a finding of the pass is one the
    /// validation policy aborts on.
    fn apply(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError>;
}

/// Runs the passes to a fixed point.
pub struct Simplifier {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
}

impl Simplifier {
    /// Creates a simplifier with the standard passes.
    pub fn new(max_iterations: usize) -> Self {
        Self::with_passes(
            vec![
                Box::new(ConsolidateTypes),
                Box::new(FlattenOptions),
                Box::new(AssignEdgeLogic),
                Box::new(FoldGotos),
                Box::new(EliminateDecisionPoints),
                Box::new(MergeNotes),
                Box::new(FoldAnnotations),
                Box::new(AnnotateGroups),
            ],
            max_iterations,
        )
    }

    pub fn with_passes(passes: Vec<Box<dyn Pass>>, max_iterations: usize) -> Self {
        Self {
            passes,
            max_iterations,
        }
    }

    /// Simplifies `diagram`.
    ///
    /// Reaching the round limit without a fixed point is a warning; the
    /// diagram of the last round is returned.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] of the first pass finding the validation
    /// policy aborts on.
    pub fn run(&self, diagram: &Diagram, cx: &mut PassContext<'_>) -> Result<Diagram, ParseError> {
        let mut current = diagram.clone();

        for round in 1..=self.max_iterations {
            cx.set_round(round);
            let mut next = current.clone();
            for pass in &self.passes {
                next = pass.apply(&next, cx)?;
                trace!(round, pass = pass.name(), nodes = next.nodes_count(); "Pass applied");
            }

            if next == current {
                debug!(rounds = round; "Simplifier reached a fixed point");
                return Ok(next);
            }
            current = next;
        }

        cx.report(
            Diagnostic::warning(format!(
                "simplification did not settle within {} rounds",
                self.max_iterations
            ))
            .with_code(ErrorCode::E400)
            .with_help("raise `simplify.max_iterations` in the configuration"),
        )?;
        Ok(current)
    }
}
