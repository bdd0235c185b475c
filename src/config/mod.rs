//! Configuration management for the Taiji puzzle solver

pub mod settings;

pub use settings::{
    CliOverrides, InputConfig, OutputConfig, OutputFormat, Settings, SolverConfig,
};
