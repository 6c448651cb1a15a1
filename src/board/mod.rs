//! Board representation.
//!
//! Contains the cell colors, integer coordinates, and the grid that stores
//! one color per cell.

pub mod color;
pub mod coord;
pub mod grid;

pub use color::{Color, MAX_COLOR_VARIANTS, REAL_COLORS};
pub use coord::{Coord, Direction, DIRECTIONS};
pub use grid::{Grid, GridError};
