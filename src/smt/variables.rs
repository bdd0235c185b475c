//! Per-tile solver unknowns
//!
//! Decoded tiles stay immutable; the unknowns the solver reasons about
//! live here, keyed by grid position.

use super::solver::SmtSolver;
use crate::puzzle::PuzzleGrid;
use std::fmt;
use z3::ast::{Bool, Int};
use z3::Context;

/// A tile's coloring: a puzzle-given constant or a free boolean unknown
pub enum Coloring<'ctx> {
    Fixed(bool),
    Free(Bool<'ctx>),
}

impl<'ctx> Coloring<'ctx> {
    /// Resolve to a boolean term usable in constraints
    pub fn as_bool(&self, ctx: &'ctx Context) -> Bool<'ctx> {
        match self {
            Coloring::Fixed(value) => Bool::from_bool(ctx, *value),
            Coloring::Free(var) => var.clone(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Coloring::Fixed(_))
    }
}

/// Unknowns owned by one existing tile
pub struct TileVars<'ctx> {
    pub coloring: Coloring<'ctx>,
    pub region: Int<'ctx>,
}

/// All unknowns of one puzzle instance: per-tile variables plus the
/// distinguished total region count
pub struct PuzzleVars<'ctx> {
    faces: Int<'ctx>,
    vars: Vec<Option<TileVars<'ctx>>>,
    width: usize,
}

impl<'ctx> PuzzleVars<'ctx> {
    /// Allocate variables for every existing tile. Each tile gets a
    /// fresh region id bounded by `0 <= region < faces`, and a fresh
    /// coloring unknown unless the tile is fixed, in which case its
    /// decoded literal is the constant.
    pub fn allocate(ctx: &'ctx Context, solver: &mut SmtSolver<'ctx>, grid: &PuzzleGrid) -> Self {
        let faces = Int::fresh_const(ctx, "faces");
        let zero = Int::from_i64(ctx, 0);

        let mut vars: Vec<Option<TileVars<'ctx>>> = Vec::with_capacity(grid.width() * grid.height());
        for (x, y) in grid.positions() {
            let tile = grid.tile(x, y);
            if !tile.exist {
                vars.push(None);
                continue;
            }

            let region = Int::fresh_const(ctx, "region");
            solver.assert(&region.ge(&zero));
            solver.assert(&region.lt(&faces));

            let coloring = if tile.fixed {
                Coloring::Fixed(tile.lit)
            } else {
                Coloring::Free(Bool::fresh_const(ctx, "coloring"))
            };

            vars.push(Some(TileVars { coloring, region }));
        }

        Self {
            faces,
            vars,
            width: grid.width(),
        }
    }

    /// Variables of the tile at (x, y); None for non-existent tiles
    pub fn get(&self, x: usize, y: usize) -> Option<&TileVars<'ctx>> {
        self.vars.get(y * self.width + x).and_then(|v| v.as_ref())
    }

    /// The unknown total region count
    pub fn faces(&self) -> &Int<'ctx> {
        &self.faces
    }

    pub fn statistics(&self) -> VariableStatistics {
        let mut stats = VariableStatistics::default();
        for cell in self.vars.iter().flatten() {
            stats.region_vars += 1;
            if cell.coloring.is_fixed() {
                stats.fixed_colorings += 1;
            } else {
                stats.coloring_vars += 1;
            }
        }
        stats
    }
}

/// Counts of allocated unknowns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStatistics {
    pub coloring_vars: usize,
    pub fixed_colorings: usize,
    pub region_vars: usize,
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Coloring unknowns: {}", self.coloring_vars)?;
        writeln!(f, "  Fixed colorings: {}", self.fixed_colorings)?;
        writeln!(f, "  Region unknowns: {}", self.region_vars)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::puzzle::decode;
    use z3::Config;

    fn with_vars<F: FnOnce(&PuzzleGrid, &PuzzleVars<'_>)>(code: &str, f: F) {
        let grid = decode(code).unwrap();
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut solver = SmtSolver::new(&ctx, &SolverConfig { timeout_seconds: 0 });
        let vars = PuzzleVars::allocate(&ctx, &mut solver, &grid);
        f(&grid, &vars);
    }

    #[test]
    fn test_allocation_counts() {
        with_vars("2:0000", |_, vars| {
            let stats = vars.statistics();
            assert_eq!(stats.region_vars, 4);
            assert_eq!(stats.coloring_vars, 4);
            assert_eq!(stats.fixed_colorings, 0);
        });
    }

    #[test]
    fn test_fixed_tile_gets_constant_coloring() {
        // option 6 = fixed + lit, option 4 = fixed + dark
        with_vars("2:6040", |_, vars| {
            let fixed = vars.get(0, 0).unwrap();
            assert!(matches!(fixed.coloring, Coloring::Fixed(true)));

            let dark = vars.get(0, 1).unwrap();
            assert!(matches!(dark.coloring, Coloring::Fixed(false)));

            let free = vars.get(1, 0).unwrap();
            assert!(matches!(free.coloring, Coloring::Free(_)));

            let stats = vars.statistics();
            assert_eq!(stats.fixed_colorings, 2);
            assert_eq!(stats.coloring_vars, 2);
            assert_eq!(stats.region_vars, 4);
        });
    }

    #[test]
    fn test_missing_tiles_get_no_variables() {
        with_vars("2:00-B", |grid, vars| {
            assert_eq!(grid.existing_count(), 2);
            assert!(vars.get(0, 0).is_some());
            assert!(vars.get(1, 0).is_some());
            assert!(vars.get(0, 1).is_none());
            assert!(vars.get(1, 1).is_none());

            let stats = vars.statistics();
            assert_eq!(stats.region_vars, 2);
        });
    }
}
