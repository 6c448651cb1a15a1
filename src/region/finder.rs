//! Connected-region discovery.
//!
//! A region is the maximal set of same-colored cells reachable from a start
//! cell through orthogonal steps. The search uses an explicit stack and a
//! visited table indexed by cell, so every cell enters the frontier at most
//! once and call depth stays constant regardless of board size.

use std::collections::BTreeSet;

use crate::board::{Color, Coord, Grid, GridError, DIRECTIONS};

/// Errors raised by region lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("cell {0} is empty")]
    EmptyCellSelected(Coord),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A maximal same-color, orthogonally connected group of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub color: Color,
    pub cells: BTreeSet<Coord>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the region is a single cell, i.e. not a legal move.
    pub fn is_alone(&self) -> bool {
        self.cells.len() == 1
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    /// Distinct columns the region touches, ascending.
    pub fn columns(&self) -> BTreeSet<usize> {
        self.cells.iter().map(|c| c.x).collect()
    }
}

/// Floods out from `start` over cells equal to `color`, marking `visited`.
fn flood(grid: &Grid, start: Coord, color: Color, visited: &mut [bool]) -> Region {
    let mut cells = BTreeSet::new();
    let mut stack = vec![start];
    visited[grid.index(start)] = true;
    cells.insert(start);

    while let Some(cur) = stack.pop() {
        for dir in DIRECTIONS {
            let next = match cur.step(dir) {
                Some(n) if grid.is_in_bounds(n) => n,
                _ => continue,
            };
            let idx = grid.index(next);
            if visited[idx] || grid.cells()[idx] != color {
                continue;
            }
            visited[idx] = true;
            cells.insert(next);
            stack.push(next);
        }
    }

    Region { color, cells }
}

/// Finds the region containing `start`.
pub fn find_region(grid: &Grid, start: Coord) -> Result<Region, RegionError> {
    let color = grid.get(start)?;
    if color == Color::Empty {
        return Err(RegionError::EmptyCellSelected(start));
    }
    let mut visited = vec![false; grid.cell_count()];
    Ok(flood(grid, start, color, &mut visited))
}

/// Returns true when the cell shares its color with none of its four
/// neighbors, which is exactly when its region has size 1.
///
/// Empty cells count as alone: there is nothing to match.
pub fn is_alone(grid: &Grid, coord: Coord) -> Result<bool, GridError> {
    let color = grid.get(coord)?;
    if color == Color::Empty {
        return Ok(true);
    }
    Ok(!DIRECTIONS
        .iter()
        .any(|&dir| grid.neighbor(coord, dir) == Some(color)))
}

/// Every region on the board. Each non-empty cell belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPartition {
    regions: Vec<Region>,
    /// Region index per cell in grid storage order; None for empty cells.
    owner: Vec<Option<usize>>,
    width: usize,
}

impl BoardPartition {
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The region that owns `coord`, if the cell is occupied.
    pub fn region_of(&self, coord: Coord) -> Option<&Region> {
        if coord.x >= self.width {
            return None;
        }
        let idx = coord.y * self.width + coord.x;
        self.owner.get(idx).copied().flatten().map(|i| &self.regions[i])
    }

    /// Number of regions with at least `min_size` cells.
    pub fn playable_count(&self, min_size: usize) -> usize {
        self.regions.iter().filter(|r| r.len() >= min_size).count()
    }

    /// Size of the largest region, or 0 on an empty board.
    pub fn largest(&self) -> usize {
        self.regions.iter().map(Region::len).max().unwrap_or(0)
    }
}

/// Partitions the whole board into regions.
///
/// Cells are visited column by column from the bottom, so the same grid
/// always yields the same regions in the same order.
pub fn find_all_regions(grid: &Grid) -> BoardPartition {
    let mut visited = vec![false; grid.cell_count()];
    let mut owner = vec![None; grid.cell_count()];
    let mut regions = Vec::new();

    for coord in grid.coords() {
        let idx = grid.index(coord);
        let color = grid.cells()[idx];
        if visited[idx] || color == Color::Empty {
            continue;
        }
        let region = flood(grid, coord, color, &mut visited);
        for c in region.iter() {
            owner[grid.index(c)] = Some(regions.len());
        }
        regions.push(region);
    }

    BoardPartition {
        regions,
        owner,
        width: grid.width(),
    }
}
