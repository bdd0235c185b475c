//! Puzzle constraint construction
//!
//! Translates the decoded grid into assertions over the tile unknowns:
//! region/coloring agreement on adjacent pairs, the global
//! Euler-characteristic identity that keeps the coloring boundary a
//! valid loop structure, and the per-symbol constraints (flowers, dots,
//! diamonds).

use super::solver::SmtSolver;
use super::variables::{PuzzleVars, TileVars};
use crate::puzzle::{Color, PuzzleGrid, Symbol, Tile};
use anyhow::{Context as _, Result};
use itertools::iproduct;
use std::collections::HashSet;
use std::fmt;
use z3::ast::{forall_const, Ast, Bool, Int};
use z3::{Context, FuncDecl, Sort};

/// One weighted term of the Euler-characteristic sum: `weight` counts
/// iff `condition` holds in the model
pub struct EulerTerm<'ctx> {
    pub condition: Bool<'ctx>,
    pub weight: i64,
}

/// Builds every assertion for one puzzle instance
pub struct ConstraintBuilder<'ctx, 'p> {
    ctx: &'ctx Context,
    grid: &'p PuzzleGrid,
    vars: &'p PuzzleVars<'ctx>,
}

impl<'ctx, 'p> ConstraintBuilder<'ctx, 'p> {
    pub fn new(ctx: &'ctx Context, grid: &'p PuzzleGrid, vars: &'p PuzzleVars<'ctx>) -> Self {
        Self { ctx, grid, vars }
    }

    /// Apply the complete constraint system to the solver
    pub fn apply(&self, solver: &mut SmtSolver<'ctx>) -> Result<ConstraintStatistics> {
        let mut stats = ConstraintStatistics::default();

        let mut terms = self.link_boundaries(solver, &mut stats);
        terms.extend(self.vertex_terms());
        stats.euler_terms = terms.len();
        self.assert_euler_identity(solver, &terms);

        stats.flower_constraints = self.assert_flowers(solver);
        self.assert_region_aggregate(solver, &mut stats)?;
        stats.diamond_constraints = self.assert_diamonds(solver);

        Ok(stats)
    }

    fn cell(&self, x: usize, y: usize) -> Option<&'p TileVars<'ctx>> {
        self.vars.get(x, y)
    }

    fn coloring(&self, cell: &TileVars<'ctx>) -> Bool<'ctx> {
        cell.coloring.as_bool(self.ctx)
    }

    /// Tie region agreement to coloring agreement for every adjacent
    /// pair of existing tiles (left and up links, so each pair once),
    /// and fold the boundary-edge terms of the Euler sum.
    fn link_boundaries(
        &self,
        solver: &mut SmtSolver<'ctx>,
        stats: &mut ConstraintStatistics,
    ) -> Vec<EulerTerm<'ctx>> {
        let mut terms = Vec::new();

        for (x, y, _) in self.grid.existing() {
            let Some(cell) = self.cell(x, y) else { continue };
            let cell_lit = self.coloring(cell);

            let mut links = Vec::new();
            if x > 0 {
                links.push((x - 1, y));
            }
            if y > 0 {
                links.push((x, y - 1));
            }

            for (nx, ny) in links {
                let Some(other) = self.cell(nx, ny) else { continue };
                let other_lit = self.coloring(other);

                let same_coloring = cell_lit._eq(&other_lit);
                let same_region = cell.region._eq(&other.region);

                // region ids are exactly the labels of coloring-connected
                // components
                solver.assert(&same_coloring._eq(&same_region));
                stats.boundary_links += 1;

                terms.push(EulerTerm {
                    condition: same_coloring.not(),
                    weight: -1,
                });
            }
        }

        terms
    }

    /// Boundary-vertex terms: one per 2x2 block in which at least one
    /// present adjacent pair disagrees in coloring. A block with missing
    /// cells keeps the disagreement conditions its present cells still
    /// form.
    fn vertex_terms(&self) -> Vec<EulerTerm<'ctx>> {
        let mut terms = Vec::new();
        if self.grid.width() < 2 || self.grid.height() < 2 {
            return terms;
        }

        for (y, x) in iproduct!(0..self.grid.height() - 1, 0..self.grid.width() - 1) {
            let a = self.cell(x, y).map(|c| self.coloring(c));
            let b = self.cell(x + 1, y).map(|c| self.coloring(c));
            let c = self.cell(x, y + 1).map(|c| self.coloring(c));
            let d = self.cell(x + 1, y + 1).map(|c| self.coloring(c));

            let mut disagreements = Vec::new();
            for (u, v) in [(&a, &b), (&a, &c), (&b, &d), (&c, &d)] {
                if let (Some(u), Some(v)) = (u, v) {
                    disagreements.push(u._eq(v).not());
                }
            }

            if disagreements.is_empty() {
                continue;
            }
            let refs: Vec<&Bool> = disagreements.iter().collect();
            terms.push(EulerTerm {
                condition: Bool::or(self.ctx, &refs),
                weight: 1,
            });
        }

        terms
    }

    /// The single global topology assertion:
    /// `outerVertices - outerEdges + faces + sum(terms) = 1`.
    /// The outer grid boundary contributes `2*width + 2*height` vertices
    /// and as many edges; the implicit outer face is excluded, hence 1
    /// rather than the planar 2.
    fn assert_euler_identity(&self, solver: &mut SmtSolver<'ctx>, terms: &[EulerTerm<'ctx>]) {
        let zero = Int::from_i64(self.ctx, 0);
        let outer_edges = 2 * (self.grid.width() + self.grid.height()) as i64;
        let outer_vertices = outer_edges;

        let mut summands = vec![
            Int::from_i64(self.ctx, outer_vertices - outer_edges),
            self.vars.faces().clone(),
        ];
        summands.extend(
            terms
                .iter()
                .map(|term| term.condition.ite(&Int::from_i64(self.ctx, term.weight), &zero)),
        );

        let refs: Vec<&Int> = summands.iter().collect();
        let euler_sum = Int::add(self.ctx, &refs);
        solver.assert(&euler_sum._eq(&Int::from_i64(self.ctx, 1)));
    }

    /// Flower tiles: the number of neighbors disagreeing with the tile's
    /// coloring equals the flower's variant index.
    fn assert_flowers(&self, solver: &mut SmtSolver<'ctx>) -> usize {
        let mut count = 0;

        for (x, y, tile) in self.grid.existing() {
            let Some(k) = tile.symbol.flower_index() else {
                continue;
            };
            let Some(cell) = self.cell(x, y) else { continue };
            let cell_lit = self.coloring(cell);

            let disagreements: Vec<Bool> = self
                .grid
                .neighbors(x, y)
                .filter_map(|(nx, ny, _)| self.cell(nx, ny))
                .map(|other| cell_lit._eq(&self.coloring(other)).not())
                .collect();

            count += 1;

            if disagreements.is_empty() {
                // a neighborless flower can only demand zero
                if k > 0 {
                    solver.assert(&Bool::from_bool(self.ctx, false));
                }
                continue;
            }

            let weighted: Vec<(&Bool, i32)> =
                disagreements.iter().map(|cond| (cond, 1)).collect();
            solver.assert(&Bool::pb_eq(self.ctx, &weighted, i32::from(k)));
        }

        count
    }

    /// Universally quantified per-region assertions: every declared
    /// region id is realized, and regions holding dot tiles have a cell
    /// count matching their signed dot sum (or a sum of exactly zero).
    /// Color consistency of dot tiles is asserted per tile through an
    /// uninterpreted region-to-color map.
    fn assert_region_aggregate(
        &self,
        solver: &mut SmtSolver<'ctx>,
        stats: &mut ConstraintStatistics,
    ) -> Result<()> {
        let zero = Int::from_i64(self.ctx, 0);
        let one = Int::from_i64(self.ctx, 1);

        let region = Int::fresh_const(self.ctx, "candidate");
        let valid = Bool::and(self.ctx, &[&region.ge(&zero), &region.lt(self.vars.faces())]);

        let membership: Vec<Bool> = self
            .grid
            .existing()
            .filter_map(|(x, y, _)| self.cell(x, y))
            .map(|cell| cell.region._eq(&region))
            .collect();

        if membership.is_empty() {
            // no tile can realize the face the outer boundary demands
            solver.assert(&Bool::from_bool(self.ctx, false));
            return Ok(());
        }

        let mut body = Vec::new();

        // (a) no declared region id is wasted
        let weighted: Vec<(&Bool, i32)> = membership.iter().map(|cond| (cond, 1)).collect();
        body.push(Bool::pb_ge(self.ctx, &weighted, 1));

        // (b) dot tiles pin the size of their region
        if self.grid.has_dot_tiles() {
            let cell_counts: Vec<Int> = membership.iter().map(|m| m.ite(&one, &zero)).collect();
            let refs: Vec<&Int> = cell_counts.iter().collect();
            let region_size = Int::add(self.ctx, &refs);

            let dot_terms: Vec<Int> = self
                .grid
                .dot_tiles()
                .filter_map(|(x, y, tile)| {
                    let cell = self.cell(x, y)?;
                    let value = tile.symbol.dot_value()?;
                    Some(
                        cell.region
                            ._eq(&region)
                            .ite(&Int::from_i64(self.ctx, value), &zero),
                    )
                })
                .collect();
            let refs: Vec<&Int> = dot_terms.iter().collect();
            let dot_sum = Int::add(self.ctx, &refs);

            body.push(Bool::or(
                self.ctx,
                &[&region_size._eq(&dot_sum), &dot_sum._eq(&zero)],
            ));
        }

        let body_refs: Vec<&Bool> = body.iter().collect();
        let quantified = forall_const(
            self.ctx,
            &[&region],
            &[],
            &valid.implies(&Bool::and(self.ctx, &body_refs)),
        );
        solver.assert(&quantified);

        // (c) dot tiles sharing a region agree on color. Only declared
        // when colored dot tiles actually carry more than one color.
        let dot_colors: HashSet<Color> = self
            .grid
            .dot_tiles()
            .filter_map(|(_, _, tile)| tile.color)
            .collect();

        if dot_colors.len() > 1 {
            stats.has_region_color_map = true;
            let int_sort = Sort::int(self.ctx);
            let region_color = FuncDecl::new(self.ctx, "region_color", &[&int_sort], &int_sort);

            for (x, y, tile) in self.grid.dot_tiles() {
                let Some(color) = tile.color else { continue };
                let Some(cell) = self.cell(x, y) else { continue };

                let mapped = region_color
                    .apply(&[&cell.region])
                    .as_int()
                    .context("region color map must produce an integer term")?;
                solver.assert(&mapped._eq(&Int::from_i64(self.ctx, color.index())));
            }
        }

        Ok(())
    }

    /// Colored diamond tiles: exactly one other tile shares the
    /// diamond's region id among the color-compatible candidates, over
    /// the whole grid.
    fn assert_diamonds(&self, solver: &mut SmtSolver<'ctx>) -> usize {
        let mut count = 0;

        for (x, y, tile) in self.grid.existing() {
            if tile.symbol != Symbol::Diamond {
                continue;
            }
            let Some(color) = tile.color else { continue };
            let Some(cell) = self.cell(x, y) else { continue };

            let partners: Vec<Bool> = self
                .grid
                .existing()
                .filter(|&(nx, ny, other)| (nx, ny) != (x, y) && diamond_compatible(color, other))
                .filter_map(|(nx, ny, _)| self.cell(nx, ny))
                .map(|other| cell.region._eq(&other.region))
                .collect();

            count += 1;

            if partners.is_empty() {
                // no compatible tile anywhere: the requirement is
                // unmeetable
                solver.assert(&Bool::from_bool(self.ctx, false));
                continue;
            }

            let weighted: Vec<(&Bool, i32)> = partners.iter().map(|cond| (cond, 1)).collect();
            solver.assert(&Bool::pb_eq(self.ctx, &weighted, 1));
        }

        count
    }
}

/// Diamond partner compatibility: same color, or a flower variant the
/// diamond's color accepts (purple pairs with flowers 0-3, yellow with
/// flowers 1-4).
pub fn diamond_compatible(diamond_color: Color, candidate: &Tile) -> bool {
    if candidate.color == Some(diamond_color) {
        return true;
    }
    match (diamond_color, candidate.symbol.flower_index()) {
        (Color::Purple, Some(k)) => k <= 3,
        (Color::Yellow, Some(k)) => k >= 1,
        _ => false,
    }
}

/// Counts describing the built constraint system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintStatistics {
    pub boundary_links: usize,
    pub euler_terms: usize,
    pub flower_constraints: usize,
    pub diamond_constraints: usize,
    pub has_region_color_map: bool,
}

impl fmt::Display for ConstraintStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Constraint Statistics:")?;
        writeln!(f, "  Boundary links: {}", self.boundary_links)?;
        writeln!(f, "  Euler terms: {}", self.euler_terms)?;
        writeln!(f, "  Flower constraints: {}", self.flower_constraints)?;
        writeln!(f, "  Diamond constraints: {}", self.diamond_constraints)?;
        writeln!(
            f,
            "  Region color map: {}",
            if self.has_region_color_map {
                "yes"
            } else {
                "no"
            }
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::puzzle::decode;
    use z3::Config;

    fn build_stats(code: &str) -> ConstraintStatistics {
        let grid = decode(code).unwrap();
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut solver = SmtSolver::new(&ctx, &SolverConfig { timeout_seconds: 0 });
        let vars = PuzzleVars::allocate(&ctx, &mut solver, &grid);
        let builder = ConstraintBuilder::new(&ctx, &grid, &vars);
        builder.apply(&mut solver).unwrap()
    }

    #[test]
    fn test_full_block_term_counts() {
        let stats = build_stats("2:0000");
        // four adjacent pairs, one 2x2 block
        assert_eq!(stats.boundary_links, 4);
        assert_eq!(stats.euler_terms, 5);
        assert_eq!(stats.flower_constraints, 0);
        assert_eq!(stats.diamond_constraints, 0);
        assert!(!stats.has_region_color_map);
    }

    #[test]
    fn test_missing_tiles_drop_terms() {
        // bottom row does not exist: one horizontal link, and the block
        // keeps only the top pair's disagreement condition
        let stats = build_stats("2:00-B");
        assert_eq!(stats.boundary_links, 1);
        assert_eq!(stats.euler_terms, 2);
    }

    #[test]
    fn test_hole_degrades_block_to_disjunction() {
        // one corner of the single 2x2 block missing: the block still
        // contributes one vertex term from the remaining pairs
        let stats = build_stats("2:0008");
        assert_eq!(stats.boundary_links, 2);
        assert_eq!(stats.euler_terms, 3);
    }

    #[test]
    fn test_flower_and_diamond_counting() {
        let stats = build_stats("5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C");
        assert_eq!(stats.flower_constraints, 1);
        assert_eq!(stats.diamond_constraints, 2);
        // dot tiles carry both purple and yellow
        assert!(stats.has_region_color_map);
        // 5x5 full grid: 40 adjacent pairs, 16 blocks
        assert_eq!(stats.boundary_links, 40);
        assert_eq!(stats.euler_terms, 56);
    }

    #[test]
    fn test_single_color_dots_skip_color_map() {
        let stats = build_stats("2:Ap0Bp00000");
        assert!(!stats.has_region_color_map);
    }

    #[test]
    fn test_diamond_compatibility_predicate() {
        let mut flower = Tile::empty();
        flower.symbol = Symbol::Flower(0);
        assert!(diamond_compatible(Color::Purple, &flower));
        assert!(!diamond_compatible(Color::Yellow, &flower));

        flower.symbol = Symbol::Flower(4);
        assert!(!diamond_compatible(Color::Purple, &flower));
        assert!(diamond_compatible(Color::Yellow, &flower));

        flower.symbol = Symbol::Flower(2);
        assert!(diamond_compatible(Color::Purple, &flower));
        assert!(diamond_compatible(Color::Yellow, &flower));

        let mut colored = Tile::empty();
        colored.color = Some(Color::Red);
        assert!(diamond_compatible(Color::Red, &colored));
        assert!(!diamond_compatible(Color::Blue, &colored));
    }
}
