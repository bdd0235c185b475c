//! Independent re-check of a solution against the puzzle rules
//!
//! The solver's model is taken apart and verified with plain
//! arithmetic: the Euler sum, region realization, dot sums, flower
//! degrees, and diamond partners are all recomputed from the concrete
//! values. A disagreement here means an encoder bug, not a bad puzzle.

use super::solution::{CellValue, Solution};
use crate::puzzle::{PuzzleGrid, Symbol};
use crate::smt::diamond_compatible;
use itertools::iproduct;
use std::collections::HashMap;
use std::fmt;

/// Re-validates solutions against the decoded grid
pub struct SolutionChecker<'a> {
    grid: &'a PuzzleGrid,
}

/// A single rule the solution breaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    /// The model left a coloring unconstrained; nothing to verify
    UndeterminedColoring { x: usize, y: usize },
    /// The model left a region id unconstrained
    UndeterminedRegion { x: usize, y: usize },
    /// The model carries no total region count
    MissingFaces,
    RegionOutOfRange {
        x: usize,
        y: usize,
        region: i64,
        faces: i64,
    },
    /// Adjacent tiles where coloring and region agreement disagree
    BoundaryMismatch {
        x: usize,
        y: usize,
        nx: usize,
        ny: usize,
    },
    EulerMismatch { sum: i64 },
    EmptyRegion { region: i64 },
    DotSumMismatch { region: i64, size: i64, sum: i64 },
    FlowerDegree {
        x: usize,
        y: usize,
        expected: u8,
        actual: usize,
    },
    DiamondPartners {
        x: usize,
        y: usize,
        partners: usize,
    },
}

/// Outcome of re-checking one solution
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub is_valid: bool,
    /// The recomputed Euler-characteristic sum, when computable
    pub euler_sum: Option<i64>,
    pub violations: Vec<RuleViolation>,
}

impl<'a> SolutionChecker<'a> {
    pub fn new(grid: &'a PuzzleGrid) -> Self {
        Self { grid }
    }

    /// Check every puzzle rule against the concrete solution values
    pub fn check(&self, solution: &Solution) -> CheckReport {
        let mut violations = Vec::new();

        // concrete values per existing tile; verification needs all of
        // them
        let mut values: HashMap<(usize, usize), (bool, i64)> = HashMap::new();
        for (x, y, _) in self.grid.existing() {
            let lit = match solution.coloring_at(x, y) {
                CellValue::Known(lit) => Some(lit),
                _ => {
                    violations.push(RuleViolation::UndeterminedColoring { x, y });
                    None
                }
            };
            let region = match solution.region_at(x, y) {
                CellValue::Known(region) => Some(region),
                _ => {
                    violations.push(RuleViolation::UndeterminedRegion { x, y });
                    None
                }
            };
            if let (Some(lit), Some(region)) = (lit, region) {
                values.insert((x, y), (lit, region));
            }
        }

        let faces = solution.faces;
        if faces.is_none() {
            violations.push(RuleViolation::MissingFaces);
        }

        let (Some(faces), true) = (faces, violations.is_empty()) else {
            return CheckReport {
                is_valid: false,
                euler_sum: None,
                violations,
            };
        };

        for (&(x, y), &(_, region)) in &values {
            if region < 0 || region >= faces {
                violations.push(RuleViolation::RegionOutOfRange {
                    x,
                    y,
                    region,
                    faces,
                });
            }
        }

        let euler_sum = self.check_topology(&values, faces, &mut violations);
        self.check_regions(&values, faces, &mut violations);
        self.check_flowers(&values, &mut violations);
        self.check_diamonds(&values, &mut violations);

        violations.sort_by_key(violation_order);

        CheckReport {
            is_valid: violations.is_empty(),
            euler_sum: Some(euler_sum),
            violations,
        }
    }

    /// Boundary biconditional plus the Euler identity. Returns the
    /// recomputed sum; the outer grid corrections cancel by
    /// construction.
    fn check_topology(
        &self,
        values: &HashMap<(usize, usize), (bool, i64)>,
        faces: i64,
        violations: &mut Vec<RuleViolation>,
    ) -> i64 {
        let mut boundary_edges = 0i64;

        for (x, y, _) in self.grid.existing() {
            let (lit, region) = values[&(x, y)];

            let mut links = Vec::new();
            if x > 0 {
                links.push((x - 1, y));
            }
            if y > 0 {
                links.push((x, y - 1));
            }
            for (nx, ny) in links {
                let Some(&(other_lit, other_region)) = values.get(&(nx, ny)) else {
                    continue;
                };
                if (lit == other_lit) != (region == other_region) {
                    violations.push(RuleViolation::BoundaryMismatch { x, y, nx, ny });
                }
                if lit != other_lit {
                    boundary_edges += 1;
                }
            }
        }

        let mut boundary_vertices = 0i64;
        if self.grid.width() >= 2 && self.grid.height() >= 2 {
            for (y, x) in iproduct!(0..self.grid.height() - 1, 0..self.grid.width() - 1) {
                let lit = |cx: usize, cy: usize| values.get(&(cx, cy)).map(|&(lit, _)| lit);
                let (a, b, c, d) = (lit(x, y), lit(x + 1, y), lit(x, y + 1), lit(x + 1, y + 1));

                let disagree = [(a, b), (a, c), (b, d), (c, d)]
                    .iter()
                    .any(|(u, v)| matches!((u, v), (Some(u), Some(v)) if u != v));
                if disagree {
                    boundary_vertices += 1;
                }
            }
        }

        let sum = faces + boundary_vertices - boundary_edges;
        if sum != 1 {
            violations.push(RuleViolation::EulerMismatch { sum });
        }
        sum
    }

    /// Region realization and dot sums
    fn check_regions(
        &self,
        values: &HashMap<(usize, usize), (bool, i64)>,
        faces: i64,
        violations: &mut Vec<RuleViolation>,
    ) {
        let mut sizes: HashMap<i64, i64> = HashMap::new();
        let mut dot_sums: HashMap<i64, i64> = HashMap::new();

        for (x, y, tile) in self.grid.existing() {
            let (_, region) = values[&(x, y)];
            *sizes.entry(region).or_default() += 1;
            if let Some(value) = tile.symbol.dot_value() {
                *dot_sums.entry(region).or_default() += value;
            }
        }

        for region in 0..faces {
            let size = sizes.get(&region).copied().unwrap_or(0);
            if size == 0 {
                violations.push(RuleViolation::EmptyRegion { region });
                continue;
            }
            let sum = dot_sums.get(&region).copied().unwrap_or(0);
            if sum != 0 && size != sum {
                violations.push(RuleViolation::DotSumMismatch { region, size, sum });
            }
        }
    }

    /// Flower degrees: disagreeing neighbor count equals the variant
    /// index
    fn check_flowers(
        &self,
        values: &HashMap<(usize, usize), (bool, i64)>,
        violations: &mut Vec<RuleViolation>,
    ) {
        for (x, y, tile) in self.grid.existing() {
            let Some(expected) = tile.symbol.flower_index() else {
                continue;
            };
            let (lit, _) = values[&(x, y)];

            let actual = self
                .grid
                .neighbors(x, y)
                .filter_map(|(nx, ny, _)| values.get(&(nx, ny)))
                .filter(|&&(other_lit, _)| other_lit != lit)
                .count();

            if actual != usize::from(expected) {
                violations.push(RuleViolation::FlowerDegree {
                    x,
                    y,
                    expected,
                    actual,
                });
            }
        }
    }

    /// Diamond partner counts
    fn check_diamonds(
        &self,
        values: &HashMap<(usize, usize), (bool, i64)>,
        violations: &mut Vec<RuleViolation>,
    ) {
        for (x, y, tile) in self.grid.existing() {
            if tile.symbol != Symbol::Diamond {
                continue;
            }
            let Some(color) = tile.color else { continue };
            let (_, region) = values[&(x, y)];

            let partners = self
                .grid
                .existing()
                .filter(|&(nx, ny, other)| {
                    (nx, ny) != (x, y)
                        && diamond_compatible(color, other)
                        && values.get(&(nx, ny)).map(|&(_, r)| r) == Some(region)
                })
                .count();

            if partners != 1 {
                violations.push(RuleViolation::DiamondPartners { x, y, partners });
            }
        }
    }
}

fn violation_order(violation: &RuleViolation) -> u8 {
    match violation {
        RuleViolation::UndeterminedColoring { .. } => 0,
        RuleViolation::UndeterminedRegion { .. } => 1,
        RuleViolation::MissingFaces => 2,
        RuleViolation::RegionOutOfRange { .. } => 3,
        RuleViolation::BoundaryMismatch { .. } => 4,
        RuleViolation::EulerMismatch { .. } => 5,
        RuleViolation::EmptyRegion { .. } => 6,
        RuleViolation::DotSumMismatch { .. } => 7,
        RuleViolation::FlowerDegree { .. } => 8,
        RuleViolation::DiamondPartners { .. } => 9,
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::UndeterminedColoring { x, y } => {
                write!(f, "coloring at ({x}, {y}) is undetermined")
            }
            RuleViolation::UndeterminedRegion { x, y } => {
                write!(f, "region id at ({x}, {y}) is undetermined")
            }
            RuleViolation::MissingFaces => write!(f, "model carries no region count"),
            RuleViolation::RegionOutOfRange {
                x,
                y,
                region,
                faces,
            } => write!(
                f,
                "region id {region} at ({x}, {y}) outside [0, {faces})"
            ),
            RuleViolation::BoundaryMismatch { x, y, nx, ny } => write!(
                f,
                "tiles ({x}, {y}) and ({nx}, {ny}) break the coloring/region link"
            ),
            RuleViolation::EulerMismatch { sum } => {
                write!(f, "Euler-characteristic sum is {sum}, expected 1")
            }
            RuleViolation::EmptyRegion { region } => {
                write!(f, "region {region} has no tiles")
            }
            RuleViolation::DotSumMismatch { region, size, sum } => write!(
                f,
                "region {region} has {size} tiles but dot sum {sum}"
            ),
            RuleViolation::FlowerDegree {
                x,
                y,
                expected,
                actual,
            } => write!(
                f,
                "flower at ({x}, {y}) expects {expected} disagreeing neighbors, has {actual}"
            ),
            RuleViolation::DiamondPartners { x, y, partners } => write!(
                f,
                "diamond at ({x}, {y}) has {partners} partners, expected exactly 1"
            ),
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            write!(f, "solution verified")?;
            if let Some(sum) = self.euler_sum {
                write!(f, " (Euler sum {sum})")?;
            }
            return Ok(());
        }
        writeln!(f, "solution failed verification:")?;
        for violation in &self.violations {
            writeln!(f, "  - {violation}")?;
        }
        Ok(())
    }
}
