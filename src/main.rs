//! Main CLI application for the Taiji puzzle solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taiji_solver::{
    config::{CliOverrides, Settings},
    puzzle::{decode, load_code_from_file},
    solve::PuzzleProblem,
    utils::{ColorOutput, SolutionFormatter},
};

#[derive(Parser)]
#[command(name = "taiji_solver")]
#[command(about = "Taiji Puzzle SMT Solver")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a puzzle code and solve it
    Solve {
        /// Puzzle code, e.g. "5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C"
        code: Option<String>,

        /// Read the puzzle code from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Solver timeout in seconds (overrides config, 0 = unlimited)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Also print the region-id rendering pass
        #[arg(long)]
        show_regions: bool,

        /// Save the solution to the output directory
        #[arg(long)]
        save: bool,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode a puzzle code and print its structure without solving
    Decode {
        /// Puzzle code
        code: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            code,
            file,
            config,
            timeout,
            show_regions,
            save,
            output,
            verbose,
        } => solve_command(
            code,
            file,
            config,
            timeout,
            show_regions,
            save,
            output,
            verbose,
        ),
        Commands::Decode { code } => decode_command(&code),
    }
}

fn solve_command(
    code: Option<String>,
    file: Option<PathBuf>,
    config_path: PathBuf,
    timeout: Option<u64>,
    show_regions: bool,
    save: bool,
    output_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    // load configuration
    let mut settings = if config_path.exists() {
        Settings::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Settings::default()
    };

    let cli_overrides = CliOverrides {
        timeout_seconds: timeout,
        puzzle_file: file,
        output_dir,
        show_regions: show_regions.then_some(true),
    };
    settings.merge_with_cli(&cli_overrides);
    settings.validate().context("Configuration validation failed")?;

    // the code argument wins over files
    let code = match code {
        Some(code) => code,
        None => load_code_from_file(&settings.input.puzzle_file)
            .context("No puzzle code given and none readable from file")?,
    };

    let problem =
        PuzzleProblem::from_code(settings.clone(), &code).context("Failed to decode puzzle")?;

    if verbose {
        println!("{}", ColorOutput::info("Decoded puzzle:"));
        println!("{}", SolutionFormatter::format_grid_summary(problem.grid()));
    }

    println!("{}", ColorOutput::info("Setting up constraints and solving..."));
    let report = problem.solve().context("Failed to solve puzzle")?;

    print!(
        "{}",
        SolutionFormatter::format_report(&report, settings.output.show_regions)
    );

    if verbose {
        println!();
        println!("{}", report.statistics);
        if let Some(check) = &report.check {
            println!("{check}");
        }
    }

    match report.outcome.solution() {
        Some(solution) => {
            if save {
                let path = SolutionFormatter::save_solution(
                    solution,
                    &settings.output.output_directory,
                    &settings.output.format,
                )?;
                println!(
                    "{}",
                    ColorOutput::success(&format!("Solution saved to {}", path.display()))
                );
            }
        }
        None => {
            println!(
                "{}",
                ColorOutput::warning(&format!("No solution: {}", report.outcome.verdict()))
            );
        }
    }

    Ok(())
}

fn decode_command(code: &str) -> Result<()> {
    let grid = decode(code).context("Failed to decode puzzle")?;
    print!("{}", SolutionFormatter::format_grid_summary(&grid));
    println!();
    println!("Re-encoded: {}", grid.encode());
    Ok(())
}
