//! Semantic questionnaire model.
//!
//! These types describe a questionnaire page once its cells have been resolved
//! into typed nodes, edges and groups.
//!
//! # Pipeline Position
//!
//! ```text
//! draw.io XML
//!     ↓ reader
//! Cells (crate::cell)
//!     ↓ four-pass builder + validation
//! Semantic Model (these types)
//!     ↓ simplifier ⇄ logic engine
//! Questionnaire (diagram + node and edge logic)
//!     ↓ export
//! JSON
//! ```
//!
//! # Organization
//!
//! - [`diagram`] - The [`Diagram`] arena and its lookups
//! - [`element`] - [`Node`], [`Edge`], [`Group`] and the closed [`NodeType`]

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
