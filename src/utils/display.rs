//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::puzzle::{PuzzleGrid, Symbol};
use crate::solve::{SolveReport, Solution};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Format solve results for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Format a full solve report for console output
    pub fn format_report(report: &SolveReport, show_regions: bool) -> String {
        let mut output = String::new();

        output.push_str(report.outcome.verdict());
        output.push('\n');

        if let Some(solution) = report.outcome.solution() {
            output.push('\n');
            output.push_str(&Self::format_solution(solution, show_regions));
        }

        output
    }

    /// Format a solution: the coloring pass, and optionally the
    /// region-id pass
    pub fn format_solution(solution: &Solution, show_regions: bool) -> String {
        let mut output = String::new();

        output.push_str(&solution.render_coloring());
        output.push('\n');

        if show_regions {
            output.push_str("\nRegions:\n");
            output.push_str(&solution.render_regions());
            output.push('\n');
        }

        output
    }

    /// Structural summary of a decoded grid, for the decode subcommand
    pub fn format_grid_summary(grid: &PuzzleGrid) -> String {
        let mut output = String::new();

        output.push_str(&format!("Grid: {}x{}\n", grid.width(), grid.height()));
        output.push_str(&format!(
            "Existing tiles: {} of {}\n",
            grid.existing_count(),
            grid.width() * grid.height()
        ));

        let mut dots = 0;
        let mut diamonds = 0;
        let mut flowers = 0;
        let mut fixed = 0;
        let mut hidden = 0;
        for (_, _, tile) in grid.existing() {
            match tile.symbol {
                Symbol::Dot(_) => dots += 1,
                Symbol::Diamond => diamonds += 1,
                Symbol::Flower(_) => flowers += 1,
                _ => {}
            }
            if tile.fixed {
                fixed += 1;
            }
            if tile.hidden {
                hidden += 1;
            }
        }
        output.push_str(&format!(
            "Symbols: {dots} dots, {diamonds} diamonds, {flowers} flowers\n"
        ));
        output.push_str(&format!("Fixed tiles: {fixed}, hidden tiles: {hidden}\n"));

        output.push('\n');
        output.push_str(&grid.to_string());

        output
    }

    /// Save a solution to the output directory in the configured format.
    /// Returns the written path.
    pub fn save_solution<P: AsRef<Path>>(
        solution: &Solution,
        output_dir: P,
        format: &OutputFormat,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let path = match format {
            OutputFormat::Text => {
                let path = output_dir.join("solution.txt");
                let mut content = solution.render_coloring();
                content.push('\n');
                content.push('\n');
                content.push_str(&solution.render_regions());
                content.push('\n');
                std::fs::write(&path, content)?;
                path
            }
            OutputFormat::Json => {
                let path = output_dir.join("solution.json");
                solution.save_to_file(&path)?;
                path
            }
        };

        Ok(path)
    }
}

/// ANSI-colored console messages
pub struct ColorOutput;

impl ColorOutput {
    pub fn info(message: &str) -> String {
        format!("\x1b[36m{message}\x1b[0m")
    }

    pub fn success(message: &str) -> String {
        format!("\x1b[32m{message}\x1b[0m")
    }

    pub fn warning(message: &str) -> String {
        format!("\x1b[33m{message}\x1b[0m")
    }

    pub fn error(message: &str) -> String {
        format!("\x1b[31m{message}\x1b[0m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::decode;
    use crate::solve::{CellValue, SolutionMetadata};
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_solution() -> Solution {
        Solution {
            width: 2,
            height: 1,
            coloring: vec![CellValue::Known(true), CellValue::Known(false)],
            regions: vec![CellValue::Known(0), CellValue::Known(1)],
            faces: Some(2),
            solve_time: Duration::default(),
            metadata: SolutionMetadata {
                lit_cells: 1,
                dark_cells: 1,
                undetermined_cells: 0,
                fixed_cells: 0,
            },
        }
    }

    #[test]
    fn test_format_solution() {
        let text = SolutionFormatter::format_solution(&sample_solution(), false);
        assert_eq!(text, "#.\n");

        let text = SolutionFormatter::format_solution(&sample_solution(), true);
        assert!(text.contains("#."));
        assert!(text.contains("Regions:"));
        assert!(text.contains("01"));
    }

    #[test]
    fn test_format_grid_summary() {
        let grid = decode("5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C").unwrap();
        let summary = SolutionFormatter::format_grid_summary(&grid);

        assert!(summary.contains("Grid: 5x5"));
        assert!(summary.contains("Existing tiles: 25 of 25"));
        assert!(summary.contains("4 dots, 2 diamonds, 1 flowers"));
    }

    #[test]
    fn test_save_solution_text_and_json() {
        let dir = tempdir().unwrap();

        let path =
            SolutionFormatter::save_solution(&sample_solution(), dir.path(), &OutputFormat::Text)
                .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("#."));
        assert!(content.contains("01"));

        let path =
            SolutionFormatter::save_solution(&sample_solution(), dir.path(), &OutputFormat::Json)
                .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Solution = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.faces, Some(2));
    }
}
