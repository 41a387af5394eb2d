//! Logic construction for compiled questionnaires.
//!
//! The expression algebra itself lives in [`triage_core::logic`]. This module
//! decides which expressions the diagram implies:
//!
//! - [`edge_logic`] reads the condition of a single edge off its source node.
//! - [`derive_node_logic`] combines edge logic along every path into the
//!   condition under which each node is shown.

mod edge;
mod node;

pub use edge::edge_logic;
pub use node::{NodeLogic, derive_node_logic};
