//! Triage Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Triage crates:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Cells**: Raw draw.io cell records ([`cell`] module)
//! - **Styles**: draw.io style strings ([`style::Style`])
//! - **Shapes**: Shape and fill-colour classification ([`shape`] module)
//! - **Semantic**: Typed questionnaire diagrams ([`semantic`] module)
//! - **Graph**: Adjacency, ordering and reachability ([`graph`] module)
//! - **Logic**: Condition expressions and their algebra ([`logic`] module)

pub mod cell;
pub mod graph;
pub mod identifier;
pub mod logic;
pub mod semantic;
pub mod shape;
pub mod style;
