//! SMT encoding components for the puzzle solver

pub mod constraints;
pub mod encoder;
pub mod solver;
pub mod variables;

pub use constraints::{diamond_compatible, ConstraintBuilder, ConstraintStatistics, EulerTerm};
pub use encoder::{EncodingStatistics, PuzzleEncoder};
pub use solver::{SmtSolver, SolveOutcome};
pub use variables::{Coloring, PuzzleVars, TileVars, VariableStatistics};
