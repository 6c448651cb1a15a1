//! Board resolution after a move.
//!
//! Gravity compaction of emptied columns and the solvability guard that
//! reshuffles a board with no remaining move.

pub mod gravity;
pub mod guard;

pub use gravity::{apply_plan, plan_column, resolve, resolve_all, Fall, FallPlan};
pub use guard::{
    ensure_solvable, has_any_move, has_move_of_size, GuardError, GuardState, SolvabilityGuard,
    DEFAULT_MAX_RESHUFFLES,
};
