//! Board notation parser and encoder.
//!
//! A board is written as its rows from top to bottom, separated by `/`,
//! with one character per cell:
//!
//! ```text
//! bgg/kbp/..r
//! ```
//!
//! `.` is an empty cell; `b g k p r y` are blue, green, pink, purple, red
//! and yellow. The last row written is row 0, the bottom of the board.

use crate::board::{Color, Coord, Grid};

/// Largest width or height accepted by the parser.
pub const MAX_NOTATION_DIM: usize = 64;

/// Errors that can occur during board notation parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("board notation is empty")]
    Empty,

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell character: '{0}'")]
    InvalidCell(char),

    #[error("board dimensions {width}x{height} outside 1..={max}", max = MAX_NOTATION_DIM)]
    BadDimensions { width: usize, height: usize },
}

/// Parses a board notation string into a grid.
pub fn parse_board(input: &str) -> Result<Grid, NotationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NotationError::Empty);
    }

    let rows: Vec<&str> = trimmed.split('/').collect();
    let height = rows.len();
    let width = rows[0].chars().count();
    if width == 0 || width > MAX_NOTATION_DIM || height > MAX_NOTATION_DIM {
        return Err(NotationError::BadDimensions { width, height });
    }

    let mut grid = Grid::new(width, height);
    for (i, row) in rows.iter().enumerate() {
        let got = row.chars().count();
        if got != width {
            return Err(NotationError::RaggedRow {
                row: i,
                expected: width,
                got,
            });
        }
        let y = height - 1 - i;
        for (x, ch) in row.chars().enumerate() {
            let color = Color::from_notation_char(ch).ok_or(NotationError::InvalidCell(ch))?;
            grid.cells_mut()[y * width + x] = color;
        }
    }

    Ok(grid)
}

/// Encodes a grid as a board notation string.
pub fn encode_board(grid: &Grid) -> String {
    let mut result = String::with_capacity((grid.width() + 1) * grid.height());
    for y in (0..grid.height()).rev() {
        if y + 1 != grid.height() {
            result.push('/');
        }
        for x in 0..grid.width() {
            let color = grid.cells()[grid.index(Coord::new(x, y))];
            result.push(color.notation_char());
        }
    }
    result
}
