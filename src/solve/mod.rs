//! Problem driver, solution values, and independent verification

pub mod problem;
pub mod solution;
pub mod verify;

pub use problem::{PuzzleOutcome, PuzzleProblem, SolveReport};
pub use solution::{CellValue, Solution, SolutionMetadata};
pub use verify::{CheckReport, RuleViolation, SolutionChecker};
