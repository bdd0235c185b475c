//! Encoder orchestration: variables, then constraints, into one solver

use super::constraints::{ConstraintBuilder, ConstraintStatistics};
use super::solver::SmtSolver;
use super::variables::{PuzzleVars, VariableStatistics};
use crate::puzzle::PuzzleGrid;
use anyhow::Result;
use std::fmt;
use z3::Context;

/// The fully encoded puzzle: every unknown allocated and every
/// assertion applied. Holds the variables needed to read a model back.
pub struct PuzzleEncoder<'ctx> {
    vars: PuzzleVars<'ctx>,
    statistics: EncodingStatistics,
}

impl<'ctx> PuzzleEncoder<'ctx> {
    /// Encode `grid` into `solver`
    pub fn encode(
        ctx: &'ctx Context,
        grid: &PuzzleGrid,
        solver: &mut SmtSolver<'ctx>,
    ) -> Result<Self> {
        let vars = PuzzleVars::allocate(ctx, solver, grid);

        let builder = ConstraintBuilder::new(ctx, grid, &vars);
        let constraints = builder.apply(solver)?;

        let statistics = EncodingStatistics {
            grid_width: grid.width(),
            grid_height: grid.height(),
            existing_tiles: grid.existing_count(),
            variables: vars.statistics(),
            constraints,
            assertions: solver.assertion_count(),
        };

        Ok(Self { vars, statistics })
    }

    /// The allocated unknowns, for model extraction
    pub fn vars(&self) -> &PuzzleVars<'ctx> {
        &self.vars
    }

    pub fn statistics(&self) -> &EncodingStatistics {
        &self.statistics
    }
}

/// Statistics about one encoded puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingStatistics {
    pub grid_width: usize,
    pub grid_height: usize,
    pub existing_tiles: usize,
    pub variables: VariableStatistics,
    pub constraints: ConstraintStatistics,
    pub assertions: usize,
}

impl fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Encoding Statistics:")?;
        writeln!(
            f,
            "  Grid: {}x{} ({} existing tiles)",
            self.grid_width, self.grid_height, self.existing_tiles
        )?;
        writeln!(f, "  Assertions: {}", self.assertions)?;
        write!(f, "{}", self.variables)?;
        write!(f, "{}", self.constraints)?;
        Ok(())
    }
}
