//! Rectangular tile grid and adjacency queries

use super::decode::DecodeError;
use super::tile::{Symbol, Tile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded puzzle: a fixed-size, row-major grid of tiles. The shape
/// is immutable after decoding; solving never mutates the tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl PuzzleGrid {
    /// Build a grid from a row-major tile stream. The stream must fill
    /// complete rows of `width`.
    pub fn from_tiles(width: usize, tiles: Vec<Tile>) -> Result<Self, DecodeError> {
        if width == 0 {
            return Err(DecodeError::InvalidWidth("0".to_string()));
        }
        if tiles.is_empty() {
            return Err(DecodeError::Empty);
        }
        if tiles.len() % width != 0 {
            return Err(DecodeError::IncompleteRow {
                count: tiles.len(),
                width,
            });
        }

        let height = tiles.len() / width;
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Convert 2D coordinates to the row-major index
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Tile at coordinates; panics on out-of-bounds (callers iterate
    /// within the grid's own dimensions)
    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[self.index(x, y)]
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)))
    }

    /// All existing tiles with their positions, row-major
    pub fn existing(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        self.positions()
            .map(|(x, y)| (x, y, self.tile(x, y)))
            .filter(|(_, _, tile)| tile.exist)
    }

    /// Orthogonally adjacent existing tiles, fixed order: left, right,
    /// up, down. In-bounds and existing only.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
                return None;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let tile = self.tile(nx, ny);
            tile.exist.then_some((nx, ny, tile))
        })
    }

    /// Number of existing tiles
    pub fn existing_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.exist).count()
    }

    /// Existing tiles carrying a dot symbol
    pub fn dot_tiles(&self) -> impl Iterator<Item = (usize, usize, &Tile)> + '_ {
        self.existing().filter(|(_, _, tile)| tile.symbol.is_dot())
    }

    pub fn has_dot_tiles(&self) -> bool {
        self.dot_tiles().next().is_some()
    }

    /// Re-emit the compact encoding as an uncompressed token stream.
    /// Decoding the result reproduces a structurally identical grid.
    pub fn encode(&self) -> String {
        let mut out = format!("{}:", self.width);
        for tile in &self.tiles {
            if tile.is_default() {
                out.push('0');
                continue;
            }
            if let Some(letter) = tile.symbol.to_letter() {
                out.push(letter);
            }
            if let Some(color) = tile.color {
                out.push(color.to_char());
            }
            out.push(char::from_digit(tile.option_bits() as u32, 10).unwrap_or('0'));
        }
        out
    }
}

impl fmt::Display for PuzzleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = self.tile(x, y);
                let ch = if !tile.exist {
                    ' '
                } else {
                    match tile.symbol {
                        Symbol::None => '.',
                        symbol => symbol.to_letter().unwrap_or('.'),
                    }
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(width: usize, count: usize) -> PuzzleGrid {
        PuzzleGrid::from_tiles(width, vec![Tile::empty(); count]).unwrap()
    }

    #[test]
    fn test_grid_shape() {
        let grid = grid_of(3, 6);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.existing_count(), 6);
    }

    #[test]
    fn test_incomplete_row_rejected() {
        let result = PuzzleGrid::from_tiles(3, vec![Tile::empty(); 5]);
        assert!(matches!(
            result,
            Err(DecodeError::IncompleteRow { count: 5, width: 3 })
        ));

        assert!(matches!(
            PuzzleGrid::from_tiles(3, vec![]),
            Err(DecodeError::Empty)
        ));
        assert!(matches!(
            PuzzleGrid::from_tiles(0, vec![Tile::empty()]),
            Err(DecodeError::InvalidWidth(_))
        ));
    }

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = grid_of(3, 9);

        let positions: Vec<_> = grid.neighbors(1, 1).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(positions, vec![(0, 1), (2, 1), (1, 0), (1, 2)]);

        // corner has two neighbors
        let positions: Vec<_> = grid.neighbors(0, 0).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(positions, vec![(1, 0), (0, 1)]);
    }

    #[test]
    fn test_neighbors_skip_missing_tiles() {
        let mut tiles = vec![Tile::empty(); 9];
        tiles[1].exist = false; // (1, 0)
        let grid = PuzzleGrid::from_tiles(3, tiles).unwrap();

        let positions: Vec<_> = grid.neighbors(1, 1).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(positions, vec![(0, 1), (2, 1), (1, 2)]);
        assert_eq!(grid.existing_count(), 8);
    }

    #[test]
    fn test_dot_tile_lookup() {
        let mut tiles = vec![Tile::empty(); 4];
        tiles[2].symbol = Symbol::Dot(-3);
        let grid = PuzzleGrid::from_tiles(2, tiles).unwrap();

        assert!(grid.has_dot_tiles());
        let dots: Vec<_> = grid.dot_tiles().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(dots, vec![(0, 1)]);
    }
}
