//! Solution representation and rendering

use crate::puzzle::PuzzleGrid;
use crate::smt::{Coloring, PuzzleVars};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use z3::Model;

/// Characters of the coloring rendering pass
pub const PRINT_CHARS: [char; 2] = ['.', '#'];
/// Marker for a value the solver left unconstrained
pub const UNDETERMINED_CHAR: char = '~';
/// Rendering for a non-existent tile
pub const BLANK_CHAR: char = ' ';

/// A cell's value as read back from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellValue<T> {
    /// The tile does not exist; it has no variables at all
    Absent,
    /// The model does not constrain this variable; rendered explicitly
    /// rather than defaulted
    Undetermined,
    Known(T),
}

impl<T> CellValue<T> {
    pub fn known(self) -> Option<T> {
        match self {
            CellValue::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// A satisfying assignment mapped back onto the grid. Owns plain data
/// only; the solver context is gone by the time this exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub width: usize,
    pub height: usize,
    /// Row-major coloring values
    pub coloring: Vec<CellValue<bool>>,
    /// Row-major region ids
    pub regions: Vec<CellValue<i64>>,
    /// The model's total region count
    pub faces: Option<i64>,
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: SolutionMetadata,
}

/// Summary counts describing a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    pub lit_cells: usize,
    pub dark_cells: usize,
    pub undetermined_cells: usize,
    pub fixed_cells: usize,
}

impl Solution {
    /// Read every tile's values out of a satisfying model. Evaluation
    /// never completes missing assignments: a variable the solver left
    /// free becomes `Undetermined`.
    pub fn extract<'ctx>(
        grid: &PuzzleGrid,
        vars: &PuzzleVars<'ctx>,
        model: &Model<'ctx>,
        solve_time: Duration,
    ) -> Self {
        let mut coloring = Vec::with_capacity(grid.width() * grid.height());
        let mut regions = Vec::with_capacity(grid.width() * grid.height());
        let mut metadata = SolutionMetadata {
            lit_cells: 0,
            dark_cells: 0,
            undetermined_cells: 0,
            fixed_cells: 0,
        };

        for (x, y) in grid.positions() {
            let Some(cell) = vars.get(x, y) else {
                coloring.push(CellValue::Absent);
                regions.push(CellValue::Absent);
                continue;
            };

            let value = match &cell.coloring {
                Coloring::Fixed(value) => {
                    metadata.fixed_cells += 1;
                    CellValue::Known(*value)
                }
                Coloring::Free(var) => model
                    .eval(var, false)
                    .and_then(|v| v.as_bool())
                    .map(CellValue::Known)
                    .unwrap_or(CellValue::Undetermined),
            };
            match value {
                CellValue::Known(true) => metadata.lit_cells += 1,
                CellValue::Known(false) => metadata.dark_cells += 1,
                CellValue::Undetermined => metadata.undetermined_cells += 1,
                CellValue::Absent => {}
            }
            coloring.push(value);

            let region = model
                .eval(&cell.region, false)
                .and_then(|v| v.as_i64())
                .map(CellValue::Known)
                .unwrap_or(CellValue::Undetermined);
            regions.push(region);
        }

        let faces = model.eval(vars.faces(), false).and_then(|v| v.as_i64());

        Self {
            width: grid.width(),
            height: grid.height(),
            coloring,
            regions,
            faces,
            solve_time,
            metadata,
        }
    }

    pub fn coloring_at(&self, x: usize, y: usize) -> CellValue<bool> {
        self.coloring[y * self.width + x]
    }

    pub fn region_at(&self, x: usize, y: usize) -> CellValue<i64> {
        self.regions[y * self.width + x]
    }

    /// First rendering pass: the coloring grid
    pub fn render_coloring(&self) -> String {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| coloring_char(self.coloring_at(x, y)))
                    .collect::<String>()
            })
            .join("\n")
    }

    /// Second rendering pass: raw region ids, base-36 per cell
    pub fn render_regions(&self) -> String {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| region_char(self.region_at(x, y)))
                    .collect::<String>()
            })
            .join("\n")
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn coloring_char(value: CellValue<bool>) -> char {
    match value {
        CellValue::Absent => BLANK_CHAR,
        CellValue::Undetermined => UNDETERMINED_CHAR,
        CellValue::Known(lit) => PRINT_CHARS[usize::from(lit)],
    }
}

fn region_char(value: CellValue<i64>) -> char {
    match value {
        CellValue::Absent => BLANK_CHAR,
        CellValue::Undetermined => UNDETERMINED_CHAR,
        CellValue::Known(id) => u32::try_from(id)
            .ok()
            .and_then(|id| char::from_digit(id, 36))
            .unwrap_or('+'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_solution() -> Solution {
        Solution {
            width: 2,
            height: 2,
            coloring: vec![
                CellValue::Known(true),
                CellValue::Known(false),
                CellValue::Absent,
                CellValue::Undetermined,
            ],
            regions: vec![
                CellValue::Known(0),
                CellValue::Known(1),
                CellValue::Absent,
                CellValue::Known(11),
            ],
            faces: Some(3),
            solve_time: Duration::from_millis(5),
            metadata: SolutionMetadata {
                lit_cells: 1,
                dark_cells: 1,
                undetermined_cells: 1,
                fixed_cells: 0,
            },
        }
    }

    #[test]
    fn test_render_coloring() {
        let solution = known_solution();
        assert_eq!(solution.render_coloring(), "#.\n ~");
    }

    #[test]
    fn test_render_regions() {
        let solution = known_solution();
        assert_eq!(solution.render_regions(), "01\n b");
    }

    #[test]
    fn test_region_char_overflow() {
        assert_eq!(region_char(CellValue::Known(35)), 'z');
        assert_eq!(region_char(CellValue::Known(36)), '+');
        assert_eq!(region_char(CellValue::Known(-1)), '+');
    }

    #[test]
    fn test_json_round_trip() {
        let solution = known_solution();
        let json = solution.to_json().unwrap();
        let parsed: Solution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.coloring, solution.coloring);
        assert_eq!(parsed.regions, solution.regions);
        assert_eq!(parsed.faces, Some(3));
    }

    #[test]
    fn test_cell_value_known() {
        assert_eq!(CellValue::Known(7).known(), Some(7));
        assert_eq!(CellValue::<i64>::Undetermined.known(), None);
        assert_eq!(CellValue::<i64>::Absent.known(), None);
    }
}
