//! Output formatting helpers

pub mod display;

pub use display::{ColorOutput, SolutionFormatter};
