//! Taiji Puzzle SMT Solver
//!
//! This library decodes compact Taiji Maker puzzle codes, encodes the
//! puzzle rules as an SMT problem over boolean tile colorings and
//! integer region labels, and maps satisfying models back onto the
//! grid.

pub mod config;
pub mod puzzle;
pub mod smt;
pub mod solve;
pub mod utils;

pub use config::Settings;
pub use puzzle::{decode, DecodeError, PuzzleGrid};
pub use solve::{PuzzleOutcome, PuzzleProblem, Solution, SolveReport};

use anyhow::Result;

/// Decode and solve one puzzle code
pub fn solve_code(code: &str, settings: Settings) -> Result<SolveReport> {
    let problem = PuzzleProblem::from_code(settings, code)?;
    problem.solve()
}
