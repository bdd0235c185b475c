//! Tile data model: colors, symbols, and per-tile flags

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight tile colors, in alphabet order `roygbpkw`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Black,
    White,
}

const COLOR_CHARS: [(char, Color); 8] = [
    ('r', Color::Red),
    ('o', Color::Orange),
    ('y', Color::Yellow),
    ('g', Color::Green),
    ('b', Color::Blue),
    ('p', Color::Purple),
    ('k', Color::Black),
    ('w', Color::White),
];

impl Color {
    /// Parse a color from its encoding character
    pub fn from_char(ch: char) -> Option<Self> {
        COLOR_CHARS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, color)| *color)
    }

    /// The encoding character for this color
    pub fn to_char(self) -> char {
        COLOR_CHARS
            .iter()
            .find(|(_, color)| *color == self)
            .map(|(c, _)| *c)
            .unwrap_or('?')
    }

    /// Position in the color alphabet, used as the integer color index
    /// in region color-consistency constraints
    pub fn index(self) -> i64 {
        COLOR_CHARS
            .iter()
            .position(|(_, color)| *color == self)
            .unwrap_or(0) as i64
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A tile's puzzle symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    /// No symbol on this tile
    None,
    /// Signed region-size constraint, value in [-9, -1] or [1, 9]
    Dot(i8),
    /// Exactly-one-partner constraint (requires a tile color)
    Diamond,
    /// Edge decoration, decodable but rejected as unsupported
    Dash,
    /// Edge decoration, decodable but rejected as unsupported
    Slash,
    /// Boundary-degree constraint, variant index in 0..=4
    Flower(u8),
}

impl Symbol {
    /// Decode an uppercase letter from the 26-entry symbol alphabet:
    /// A-I dot 1..9, J-R dot -1..-9, S diamond, T dash, U slash,
    /// V-Z flower 0..4.
    pub fn from_letter(ch: char) -> Option<Self> {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let idx = (ch as u8) - b'A';
        Some(match idx {
            0..=8 => Symbol::Dot(idx as i8 + 1),
            9..=17 => Symbol::Dot(-(idx as i8 - 8)),
            18 => Symbol::Diamond,
            19 => Symbol::Dash,
            20 => Symbol::Slash,
            _ => Symbol::Flower(idx - 21),
        })
    }

    /// The alphabet letter for this symbol, inverse of `from_letter`
    pub fn to_letter(self) -> Option<char> {
        match self {
            Symbol::None => None,
            Symbol::Dot(v) if v > 0 => Some((b'A' + (v as u8) - 1) as char),
            Symbol::Dot(v) => Some((b'J' + ((-v) as u8) - 1) as char),
            Symbol::Diamond => Some('S'),
            Symbol::Dash => Some('T'),
            Symbol::Slash => Some('U'),
            Symbol::Flower(k) => Some((b'V' + k) as char),
        }
    }

    /// Signed dot value, if this is a dot symbol
    pub fn dot_value(self) -> Option<i64> {
        match self {
            Symbol::Dot(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Flower variant index, if this is a flower symbol
    pub fn flower_index(self) -> Option<u8> {
        match self {
            Symbol::Flower(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_dot(self) -> bool {
        matches!(self, Symbol::Dot(_))
    }

    pub fn is_flower(self) -> bool {
        matches!(self, Symbol::Flower(_))
    }
}

/// One decoded grid cell. Immutable once decoded; solver unknowns live
/// in a separate structure keyed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Optional tile color from the 8-color set
    pub color: Option<Color>,
    /// Puzzle symbol on this tile
    pub symbol: Symbol,
    /// Coloring is puzzle-given rather than solver-determined
    pub fixed: bool,
    /// Rendering hint from the editor; never a constraint
    pub hidden: bool,
    /// Whether the tile participates in the grid at all
    pub exist: bool,
    /// Decoded coloring literal; the constraint value when `fixed`
    pub lit: bool,
}

impl Tile {
    /// The default tile produced by a bare `'0'` token
    pub fn empty() -> Self {
        Self {
            color: None,
            symbol: Symbol::None,
            fixed: false,
            hidden: false,
            exist: true,
            lit: false,
        }
    }

    /// Apply a decoded option digit: bit0 hidden, bit1 lit, bit2 fixed,
    /// bit3 does-not-exist.
    pub fn with_option_bits(mut self, option: u8) -> Self {
        self.exist = option & 0b1000 == 0;
        self.fixed = option & 0b100 != 0;
        self.lit = option & 0b10 != 0;
        self.hidden = option & 0b1 != 0;
        self
    }

    /// The option digit encoding this tile's flags, inverse of
    /// `with_option_bits`
    pub fn option_bits(&self) -> u8 {
        let mut option = 0;
        if !self.exist {
            option |= 0b1000;
        }
        if self.fixed {
            option |= 0b100;
        }
        if self.lit {
            option |= 0b10;
        }
        if self.hidden {
            option |= 0b1;
        }
        option
    }

    /// True when the tile would re-encode as a bare `'0'` token
    pub fn is_default(&self) -> bool {
        self.color.is_none() && self.symbol == Symbol::None && self.option_bits() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_alphabet() {
        assert_eq!(Color::from_char('r'), Some(Color::Red));
        assert_eq!(Color::from_char('p'), Some(Color::Purple));
        assert_eq!(Color::from_char('w'), Some(Color::White));
        assert_eq!(Color::from_char('z'), None);
        assert_eq!(Color::from_char('R'), None);

        assert_eq!(Color::Purple.index(), 5);
        assert_eq!(Color::Yellow.index(), 2);

        for ch in "roygbpkw".chars() {
            let color = Color::from_char(ch).unwrap();
            assert_eq!(color.to_char(), ch);
        }
    }

    #[test]
    fn test_symbol_alphabet() {
        assert_eq!(Symbol::from_letter('A'), Some(Symbol::Dot(1)));
        assert_eq!(Symbol::from_letter('I'), Some(Symbol::Dot(9)));
        assert_eq!(Symbol::from_letter('J'), Some(Symbol::Dot(-1)));
        assert_eq!(Symbol::from_letter('R'), Some(Symbol::Dot(-9)));
        assert_eq!(Symbol::from_letter('S'), Some(Symbol::Diamond));
        assert_eq!(Symbol::from_letter('T'), Some(Symbol::Dash));
        assert_eq!(Symbol::from_letter('U'), Some(Symbol::Slash));
        assert_eq!(Symbol::from_letter('V'), Some(Symbol::Flower(0)));
        assert_eq!(Symbol::from_letter('Z'), Some(Symbol::Flower(4)));
        assert_eq!(Symbol::from_letter('a'), None);
        assert_eq!(Symbol::from_letter('0'), None);
    }

    #[test]
    fn test_symbol_letter_round_trip() {
        for ch in ('A'..='Z').into_iter() {
            let symbol = Symbol::from_letter(ch).unwrap();
            assert_eq!(symbol.to_letter(), Some(ch));
        }
        assert_eq!(Symbol::None.to_letter(), None);
    }

    #[test]
    fn test_option_bits() {
        let tile = Tile::empty().with_option_bits(0b1111);
        assert!(!tile.exist);
        assert!(tile.fixed);
        assert!(tile.lit);
        assert!(tile.hidden);
        assert_eq!(tile.option_bits(), 0b1111);

        let tile = Tile::empty().with_option_bits(0b0110);
        assert!(tile.exist);
        assert!(tile.fixed);
        assert!(tile.lit);
        assert!(!tile.hidden);

        let tile = Tile::empty().with_option_bits(8);
        assert!(!tile.exist);
        assert!(!tile.fixed);
    }

    #[test]
    fn test_default_tile() {
        assert!(Tile::empty().is_default());
        assert!(!Tile::empty().with_option_bits(0b100).is_default());

        let mut dotted = Tile::empty();
        dotted.symbol = Symbol::Dot(3);
        assert!(!dotted.is_default());
    }
}
