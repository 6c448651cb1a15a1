//! Gravity resolution.
//!
//! After a removal, each column is compacted downward independently: every
//! surviving cell drops by the number of empty rows beneath it, keeping the
//! relative order of the survivors. Cells never move sideways. The empty
//! rows that remain at the top of each column are reported for refill.

use std::collections::BTreeSet;

use crate::board::{Color, Coord, Grid, GridError};

/// One cell's descent within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub from_row: usize,
    pub to_row: usize,
}

/// The compaction of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallPlan {
    pub column: usize,
    /// Descents ordered by source row, bottom first.
    pub moves: Vec<Fall>,
    /// Rows left empty at the top of the column, ascending.
    pub empty_rows: Vec<usize>,
}

impl FallPlan {
    /// True when nothing in the column needs to move.
    pub fn is_settled(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Computes the fall plan for column `x` without touching the grid.
pub fn plan_column(grid: &Grid, x: usize) -> Result<FallPlan, GridError> {
    let mut moves = Vec::new();
    let mut drop = 0;
    for y in 0..grid.height() {
        if grid.get(Coord::new(x, y))? == Color::Empty {
            drop += 1;
        } else if drop > 0 {
            moves.push(Fall {
                from_row: y,
                to_row: y - drop,
            });
        }
    }
    let height = grid.height();
    Ok(FallPlan {
        column: x,
        moves,
        empty_rows: (height - drop..height).collect(),
    })
}

/// Applies a plan produced by [`plan_column`] on the same grid state.
///
/// Moves are applied bottom first, so every destination is already empty
/// when its cell arrives.
pub fn apply_plan(grid: &mut Grid, plan: &FallPlan) -> Result<(), GridError> {
    for fall in &plan.moves {
        let from = Coord::new(plan.column, fall.from_row);
        let color = grid.get(from)?;
        grid.set(Coord::new(plan.column, fall.to_row), color)?;
        grid.clear(from)?;
    }
    Ok(())
}

/// Clears `removed` and compacts every column it touches.
///
/// Coordinates that are already empty are fine; gravity treats them the
/// same as freshly removed cells. Returns one plan per touched column in
/// ascending column order.
pub fn resolve(grid: &mut Grid, removed: &[Coord]) -> Result<Vec<FallPlan>, GridError> {
    let mut columns = BTreeSet::new();
    for &coord in removed {
        grid.clear(coord)?;
        columns.insert(coord.x);
    }
    resolve_columns(grid, columns)
}

/// Compacts every column on the board.
pub fn resolve_all(grid: &mut Grid) -> Result<Vec<FallPlan>, GridError> {
    let width = grid.width();
    resolve_columns(grid, 0..width)
}

fn resolve_columns(
    grid: &mut Grid,
    columns: impl IntoIterator<Item = usize>,
) -> Result<Vec<FallPlan>, GridError> {
    let mut plans = Vec::new();
    for x in columns {
        let plan = plan_column(grid, x)?;
        apply_plan(grid, &plan)?;
        plans.push(plan);
    }
    Ok(plans)
}
