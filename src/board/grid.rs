//! The cell grid.
//!
//! Owns the `width × height` matrix of cell colors. Cells are stored
//! row-major with row 0 at the bottom, so `index = y * width + x`. The grid
//! knows nothing about visuals; it only answers color queries and applies
//! mutations.

use log::warn;

use super::color::Color;
use super::coord::{Coord, Direction};

/// Raised when a coordinate lies outside the grid extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A rectangular board of colored cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Virtual rows above the visible board from which new cells descend.
    spawn_margin: f32,
    cells: Vec<Color>,
}

impl Grid {
    /// Creates an all-empty grid whose spawn margin equals its height.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            spawn_margin: height as f32,
            cells: vec![Color::Empty; width * height],
        }
    }

    /// Creates an all-empty grid with an explicit spawn margin.
    ///
    /// A margin smaller than the board height would spawn cells inside the
    /// visible board, so it is raised to `height` with a warning.
    pub fn with_spawn_margin(width: usize, height: usize, spawn_margin: f32) -> Self {
        let mut grid = Grid::new(width, height);
        let floor = height as f32;
        if spawn_margin.is_finite() && spawn_margin >= floor {
            grid.spawn_margin = spawn_margin;
        } else {
            warn!(
                "spawn margin {} is smaller than board height {}; using {}",
                spawn_margin, height, floor
            );
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spawn_margin(&self) -> f32 {
        self.spawn_margin
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn check(&self, coord: Coord) -> Result<usize, GridError> {
        if self.is_in_bounds(coord) {
            Ok(self.index(coord))
        } else {
            Err(GridError::OutOfBounds {
                x: coord.x,
                y: coord.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Flat storage index of an in-bounds coordinate.
    pub(crate) fn index(&self, coord: Coord) -> usize {
        coord.y * self.width + coord.x
    }

    /// Coordinate of a flat storage index.
    pub(crate) fn coord_of(&self, index: usize) -> Coord {
        Coord::new(index % self.width, index / self.width)
    }

    /// Returns the color at `coord`.
    pub fn get(&self, coord: Coord) -> Result<Color, GridError> {
        let idx = self.check(coord)?;
        Ok(self.cells[idx])
    }

    /// Stores `color` at `coord`.
    pub fn set(&mut self, coord: Coord, color: Color) -> Result<(), GridError> {
        let idx = self.check(coord)?;
        self.cells[idx] = color;
        Ok(())
    }

    /// Empties the cell at `coord`.
    pub fn clear(&mut self, coord: Coord) -> Result<(), GridError> {
        self.set(coord, Color::Empty)
    }

    /// Empties every cell.
    pub fn clear_all(&mut self) {
        self.cells.fill(Color::Empty);
    }

    /// Color of the orthogonal neighbor of `coord` in `dir`.
    ///
    /// `None` is the out-of-bounds sentinel: it never equals a stored color,
    /// so edge cells simply have fewer candidates for matching.
    pub fn neighbor(&self, coord: Coord, dir: Direction) -> Option<Color> {
        let next = coord.step(dir)?;
        if self.is_in_bounds(next) {
            Some(self.cells[self.index(next)])
        } else {
            None
        }
    }

    /// Iterates all coordinates column by column, bottom to top.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Coord::new(x, y)))
    }

    /// Iterates the coordinates of every empty cell in fill order.
    pub fn empty_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords()
            .filter(move |c| self.cells[self.index(*c)] == Color::Empty)
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_real()).count()
    }

    /// Raw cell slice in storage order.
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Color] {
        &mut self.cells
    }
}
