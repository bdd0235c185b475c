//! Puzzle core: tile model, compact-code decoder, grid container

pub mod decode;
pub mod grid;
pub mod tile;

pub use decode::{decode, load_code_from_file, DecodeError};
pub use grid::PuzzleGrid;
pub use tile::{Color, Symbol, Tile};
