//! Grid coordinates and orthogonal directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An exact integer cell position. `y == 0` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }

    /// Returns the neighboring coordinate in `dir`, or None when it would
    /// leave the `usize` range. Board bounds are the grid's concern.
    pub fn step(self, dir: Direction) -> Option<Coord> {
        match dir {
            Direction::Up => self.y.checked_add(1).map(|y| Coord::new(self.x, y)),
            Direction::Right => self.x.checked_add(1).map(|x| Coord::new(x, self.y)),
            Direction::Down => self.y.checked_sub(1).map(|y| Coord::new(self.x, y)),
            Direction::Left => self.x.checked_sub(1).map(|x| Coord::new(x, self.y)),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// One of the four orthogonal neighbor directions. No diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// All four directions in probing order.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];
