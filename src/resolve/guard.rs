//! Solvability guard.
//!
//! Guarantees the board always offers at least one move. When no region of
//! the required size exists, the board is cleared and refilled from the
//! supply until one does, up to a bounded number of reshuffles.

use log::{debug, error};

use crate::board::Grid;
use crate::region::{find_all_regions, is_alone};
use crate::supply::SupplyError;

/// Default bound on consecutive reshuffles.
pub const DEFAULT_MAX_RESHUFFLES: u32 = 1000;

/// Errors raised while restoring a playable board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("no solvable placement found after {attempts} reshuffles")]
    NoSolvablePlacementFound { attempts: u32 },

    #[error(transparent)]
    Supply(#[from] SupplyError),
}

/// States of the reshuffle loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Check,
    Reshuffle,
    Solved,
    Exhausted,
}

/// Returns true if any cell shares its color with an orthogonal neighbor.
///
/// Stops at the first such cell.
pub fn has_any_move(grid: &Grid) -> bool {
    grid.coords().any(|c| matches!(is_alone(grid, c), Ok(false)))
}

/// Returns true if a region of at least `min_size` cells exists.
///
/// A minimum of 0 or 1 makes every occupied cell a move.
pub fn has_move_of_size(grid: &Grid, min_size: usize) -> bool {
    match min_size {
        0 | 1 => grid.occupied_count() > 0,
        2 => has_any_move(grid),
        _ => find_all_regions(grid).playable_count(min_size) > 0,
    }
}

/// Drives the check/reshuffle loop.
#[derive(Debug, Clone, Copy)]
pub struct SolvabilityGuard {
    pub max_retries: u32,
    pub min_region_size: usize,
}

impl Default for SolvabilityGuard {
    fn default() -> Self {
        SolvabilityGuard {
            max_retries: DEFAULT_MAX_RESHUFFLES,
            min_region_size: 2,
        }
    }
}

impl SolvabilityGuard {
    pub fn new(max_retries: u32, min_region_size: usize) -> Self {
        SolvabilityGuard {
            max_retries,
            min_region_size,
        }
    }

    /// Ensures `grid` has a move, reshuffling through `refill` if needed.
    ///
    /// `refill` receives a cleared grid and must fill it. Returns the
    /// number of reshuffles performed. On success the grid has a move; on
    /// `NoSolvablePlacementFound` it holds the last failed fill.
    pub fn ensure<F>(&self, grid: &mut Grid, mut refill: F) -> Result<u32, GuardError>
    where
        F: FnMut(&mut Grid) -> Result<(), SupplyError>,
    {
        let mut attempts = 0u32;
        let mut state = GuardState::Check;
        loop {
            state = match state {
                GuardState::Check => {
                    if has_move_of_size(grid, self.min_region_size) {
                        GuardState::Solved
                    } else if attempts >= self.max_retries {
                        GuardState::Exhausted
                    } else {
                        GuardState::Reshuffle
                    }
                }
                GuardState::Reshuffle => {
                    attempts += 1;
                    debug!("no move on board; reshuffle {}/{}", attempts, self.max_retries);
                    grid.clear_all();
                    refill(grid)?;
                    GuardState::Check
                }
                GuardState::Solved => return Ok(attempts),
                GuardState::Exhausted => {
                    error!("gave up after {} reshuffles without a playable board", attempts);
                    return Err(GuardError::NoSolvablePlacementFound { attempts });
                }
            };
        }
    }
}

/// Runs the guard with the standard minimum move size of 2.
pub fn ensure_solvable<F>(grid: &mut Grid, refill: F, max_retries: u32) -> Result<u32, GuardError>
where
    F: FnMut(&mut Grid) -> Result<(), SupplyError>,
{
    SolvabilityGuard::new(max_retries, 2).ensure(grid, refill)
}
