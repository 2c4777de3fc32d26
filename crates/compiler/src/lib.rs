//! A whole-program JavaScript optimizer driven by abstract interpretation.
//!
//! [`optimize`] alternates between analyzing the program, which computes a
//! finite set of possible values and a purity bit for every expression, and
//! rewriting it with the first pass that can use those results.

#![deny(non_shorthand_field_patterns)]

pub mod analysis;
mod builtins;
mod driver;
pub mod heap;
mod ops;
pub mod options;
mod passes;
pub mod registry;
pub mod scope;
pub mod state;
mod track;
mod utils;
pub mod value;

#[cfg(test)]
mod testing;

pub use analysis::{analyze, analyze_with, AnalysisResult, Facts, NodeFacts, NodeRef, Observer};
pub use driver::optimize;
pub use options::{Options, PassConfig};
pub use registry::Registry;
pub use value::{Primitive, Value};
