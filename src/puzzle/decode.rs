//! Decoder for the compact Taiji Maker puzzle encoding
//!
//! Format: `WIDTH:TOKENS`, where a `+`-separated segment starting with
//! letter `L` expands to `ord(L) - 64` empty-tile characters and a
//! `-`-separated segment expands the same way to non-existent-tile
//! characters, followed by greedy per-tile tokens.

use super::grid::PuzzleGrid;
use super::tile::{Color, Symbol, Tile};
use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;

/// Decode failures. All of these fail before any constraint is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("puzzle code has no width prefix (expected `WIDTH:...`)")]
    MissingWidth,
    #[error("invalid grid width `{0}`")]
    InvalidWidth(String),
    #[error("puzzle code contains no tiles")]
    Empty,
    #[error("connected tiles are not supported (marker `{0}`)")]
    ConnectedTiles(char),
    #[error("{0} symbols are not supported")]
    UnsupportedSymbol(&'static str),
    #[error("run segment after `{separator}` has invalid length character `{found}`")]
    BadRunLength { separator: char, found: char },
    #[error("expected option digit at position {pos}, found `{found}`")]
    ExpectedOptionDigit { pos: usize, found: char },
    #[error("tile descriptor at position {0} is truncated")]
    UnexpectedEnd(usize),
    #[error("tile count {count} does not fill complete rows of width {width}")]
    IncompleteRow { count: usize, width: usize },
}

/// Decode a puzzle code string into a grid of tiles.
///
/// Deterministic and total over well-formed input: the same code always
/// yields a structurally identical grid.
pub fn decode(code: &str) -> Result<PuzzleGrid, DecodeError> {
    let (width_str, data) = code
        .trim()
        .split_once(':')
        .ok_or(DecodeError::MissingWidth)?;
    let width: usize = width_str
        .parse()
        .map_err(|_| DecodeError::InvalidWidth(width_str.to_string()))?;
    if width == 0 {
        return Err(DecodeError::InvalidWidth(width_str.to_string()));
    }

    let data = expand_runs(data, '+', '0')?;
    let data = expand_runs(&data, '-', '8')?;
    let tiles = tokenize(&data)?;

    PuzzleGrid::from_tiles(width, tiles)
}

/// Read a puzzle code from a file: the first line that is neither empty
/// nor a `#` comment.
pub fn load_code_from_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    content
        .lines()
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .with_context(|| {
            format!(
                "Puzzle file {} contains no puzzle code",
                path.as_ref().display()
            )
        })
}

/// Expand run segments: the stream splits on `separator`, and every
/// segment after the first expands its leading length letter `L` to
/// `ord(L) - 64` copies of `fill`. Empty segments pass through.
fn expand_runs(data: &str, separator: char, fill: char) -> Result<String, DecodeError> {
    let mut segments = data.split(separator);
    let mut out = String::from(segments.next().unwrap_or(""));

    for segment in segments {
        let mut chars = segment.chars();
        if let Some(len_ch) = chars.next() {
            let count = (len_ch as u32)
                .checked_sub(64)
                .ok_or(DecodeError::BadRunLength {
                    separator,
                    found: len_ch,
                })?;
            for _ in 0..count {
                out.push(fill);
            }
            out.push_str(chars.as_str());
        }
    }

    Ok(out)
}

/// Greedy tokenizer: each token is `'0'` (default tile) or
/// `[SYMBOL][COLOR]DIGIT`.
fn tokenize(data: &str) -> Result<Vec<Tile>, DecodeError> {
    let chars: Vec<char> = data.chars().collect();
    let mut tiles = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;

        if chars[i] == '0' {
            tiles.push(Tile::empty());
            i += 1;
            continue;
        }

        if matches!(chars[i], '<' | '^' | '/') {
            return Err(DecodeError::ConnectedTiles(chars[i]));
        }

        let mut tile = Tile::empty();

        if let Some(symbol) = Symbol::from_letter(chars[i]) {
            match symbol {
                Symbol::Dash => return Err(DecodeError::UnsupportedSymbol("dash")),
                Symbol::Slash => return Err(DecodeError::UnsupportedSymbol("slash")),
                _ => {}
            }
            tile.symbol = symbol;
            i += 1;
        }

        if let Some(color) = chars.get(i).copied().and_then(Color::from_char) {
            tile.color = Some(color);
            i += 1;
        }

        let option_ch = *chars.get(i).ok_or(DecodeError::UnexpectedEnd(start))?;
        let option = option_ch
            .to_digit(10)
            .ok_or(DecodeError::ExpectedOptionDigit {
                pos: i,
                found: option_ch,
            })? as u8;
        tiles.push(tile.with_option_bits(option));
        i += 1;
    }

    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_decode_default_tiles() {
        let grid = decode("2:0000").unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        for (_, _, tile) in grid.existing() {
            assert!(tile.is_default());
        }
    }

    #[test]
    fn test_decode_symbol_color_option() {
        let grid = decode("2:Sp0Fy300").unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);

        let diamond = grid.tile(0, 0);
        assert_eq!(diamond.symbol, Symbol::Diamond);
        assert_eq!(diamond.color, Some(Color::Purple));
        assert!(diamond.exist && !diamond.fixed);

        let dot = grid.tile(1, 0);
        assert_eq!(dot.symbol, Symbol::Dot(6));
        assert_eq!(dot.color, Some(Color::Yellow));
        assert!(dot.lit && dot.hidden && !dot.fixed);
    }

    #[test]
    fn test_decode_option_bits() {
        // bare digit token: option bits only
        let grid = decode("1:6").unwrap();
        let tile = grid.tile(0, 0);
        assert!(tile.exist);
        assert!(tile.fixed);
        assert!(tile.lit);
        assert!(!tile.hidden);

        let grid = decode("1:8").unwrap();
        assert!(!grid.tile(0, 0).exist);
        assert_eq!(grid.existing_count(), 0);
    }

    #[test]
    fn test_plus_run_expansion() {
        // +C expands to three empty tiles
        let grid = decode("2:0+C0").unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.existing_count(), 6);
    }

    #[test]
    fn test_minus_run_expansion() {
        // -B expands to two non-existent tiles
        let grid = decode("2:00-B").unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.existing_count(), 2);
        assert!(!grid.tile(0, 1).exist);
        assert!(!grid.tile(1, 1).exist);
    }

    #[test]
    fn test_decode_reference_puzzle() {
        let grid = decode("5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C").unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.existing_count(), 25);

        assert_eq!(grid.tile(2, 0).symbol, Symbol::Diamond);
        assert_eq!(grid.tile(2, 0).color, Some(Color::Purple));
        assert_eq!(grid.tile(2, 1).symbol, Symbol::Dot(6));
        assert_eq!(grid.tile(2, 1).color, Some(Color::Yellow));
        assert_eq!(grid.tile(0, 2).symbol, Symbol::Dot(-1));
        assert_eq!(grid.tile(0, 2).color, Some(Color::Purple));
        assert_eq!(grid.tile(2, 2).symbol, Symbol::Flower(2));
        assert_eq!(grid.tile(4, 2).symbol, Symbol::Dot(-1));
        assert_eq!(grid.tile(4, 2).color, Some(Color::Yellow));
        assert_eq!(grid.tile(2, 3).symbol, Symbol::Dot(6));
        assert_eq!(grid.tile(2, 3).color, Some(Color::Purple));
        assert_eq!(grid.tile(2, 4).symbol, Symbol::Diamond);
        assert_eq!(grid.tile(2, 4).color, Some(Color::Yellow));
    }

    #[test]
    fn test_connected_tiles_rejected() {
        for code in ["2:0<00", "2:^000", "3:00/0"] {
            let result = decode(code);
            assert!(
                matches!(result, Err(DecodeError::ConnectedTiles(_))),
                "expected ConnectedTiles error for {code}"
            );
        }
    }

    #[test]
    fn test_dash_and_slash_rejected() {
        assert_eq!(
            decode("2:T000"),
            Err(DecodeError::UnsupportedSymbol("dash"))
        );
        assert_eq!(
            decode("2:00U0"),
            Err(DecodeError::UnsupportedSymbol("slash"))
        );
    }

    #[test]
    fn test_malformed_codes() {
        assert_eq!(decode("0000"), Err(DecodeError::MissingWidth));
        assert!(matches!(decode("x:00"), Err(DecodeError::InvalidWidth(_))));
        assert!(matches!(decode("0:00"), Err(DecodeError::InvalidWidth(_))));
        assert_eq!(decode("2:"), Err(DecodeError::Empty));
        assert!(matches!(
            decode("2:000"),
            Err(DecodeError::IncompleteRow { count: 3, width: 2 })
        ));
        assert!(matches!(decode("1:S"), Err(DecodeError::UnexpectedEnd(_))));
        assert!(matches!(
            decode("1:S!"),
            Err(DecodeError::ExpectedOptionDigit { .. })
        ));
        assert!(matches!(
            decode("2:0+!0"),
            Err(DecodeError::BadRunLength { separator: '+', .. })
        ));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let code = "5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C";
        let first = decode(code).unwrap();
        let second = decode(code).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        for code in [
            "2:0000",
            "1:6",
            "2:00-B",
            "5:00Sp+EFy+CJp00X00Jy+CFp+ESy+C",
        ] {
            let grid = decode(code).unwrap();
            let reencoded = grid.encode();
            let redecoded = decode(&reencoded).unwrap();
            assert_eq!(grid, redecoded, "round trip failed for {code}");
        }
    }

    #[test]
    fn test_load_code_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("puzzle.txt");
        std::fs::write(&path, "# reference puzzle\n\n2:0000\n").unwrap();

        let code = load_code_from_file(&path).unwrap();
        assert_eq!(code, "2:0000");

        let missing = dir.path().join("missing.txt");
        assert!(load_code_from_file(&missing).is_err());
    }
}
