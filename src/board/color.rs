//! Cell colors.
//!
//! A cell is either `Empty` or holds one of six real tile colors. The number
//! of colors in play is chosen per session (`color_variants`).

use serde::{Deserialize, Serialize};

/// Maximum number of distinct real colors.
pub const MAX_COLOR_VARIANTS: usize = 6;

/// The color stored in a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Empty,
    Blue,
    Green,
    Pink,
    Purple,
    Red,
    Yellow,
}

/// All real colors in palette order.
pub const REAL_COLORS: [Color; MAX_COLOR_VARIANTS] = [
    Color::Blue,
    Color::Green,
    Color::Pink,
    Color::Purple,
    Color::Red,
    Color::Yellow,
];

impl Color {
    /// Returns true for any color other than `Empty`.
    pub const fn is_real(self) -> bool {
        !matches!(self, Color::Empty)
    }

    /// Returns the single-character board notation for this color.
    pub const fn notation_char(self) -> char {
        match self {
            Color::Empty => '.',
            Color::Blue => 'b',
            Color::Green => 'g',
            Color::Pink => 'k',
            Color::Purple => 'p',
            Color::Red => 'r',
            Color::Yellow => 'y',
        }
    }

    /// Parses a color from its single-character board notation.
    pub fn from_notation_char(c: char) -> Option<Color> {
        match c {
            '.' => Some(Color::Empty),
            'b' => Some(Color::Blue),
            'g' => Some(Color::Green),
            'k' => Some(Color::Pink),
            'p' => Some(Color::Purple),
            'r' => Some(Color::Red),
            'y' => Some(Color::Yellow),
            _ => None,
        }
    }

    /// Returns the lowercase name used in protocol output.
    pub const fn name(self) -> &'static str {
        match self {
            Color::Empty => "empty",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Pink => "pink",
            Color::Purple => "purple",
            Color::Red => "red",
            Color::Yellow => "yellow",
        }
    }
}
