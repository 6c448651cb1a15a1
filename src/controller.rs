//! Board controller.
//!
//! Owns the grid, the tile supply and the coordinate → tile index, and
//! sequences a player move: validate, remove, fall, refill, re-check
//! solvability, re-tag display tiers. Every step completes before the call
//! returns; presentation only receives commands through a [`VisualAgent`].

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::{Color, Coord, Grid, GridError, REAL_COLORS};
use crate::config::{ConfigError, GameConfig};
use crate::region::{find_all_regions, find_region, is_alone, tier_map, BoardPartition, RegionError};
use crate::resolve::{gravity, GuardError, SolvabilityGuard};
use crate::supply::{Palette, SupplyError, TileId};

/// A presentation update for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualCommand {
    /// The cell's object leaves the board.
    Remove { at: Coord },
    /// The object at `from` moves to `to`.
    Move {
        from: Coord,
        to: Coord,
        color: Color,
        animate: bool,
    },
    /// A new object enters at `at`, starting `spawn_offset` rows above it.
    Spawn {
        at: Coord,
        color: Color,
        spawn_offset: f32,
        animate: bool,
    },
    /// The board was cleared and redealt `count` times before a move
    /// appeared. Sent after the last spawn and before any tier.
    Reshuffle { count: u32 },
    /// The cell belongs to a region of display tier `tier`.
    Tier { at: Coord, tier: u8 },
}

/// Receives presentation commands. Implementations must not feed back into
/// game state.
pub trait VisualAgent {
    fn apply(&mut self, command: VisualCommand);
}

impl VisualAgent for Vec<VisualCommand> {
    fn apply(&mut self, command: VisualCommand) {
        self.push(command);
    }
}

/// Discards every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAgent;

impl VisualAgent for NullAgent {
    fn apply(&mut self, _command: VisualCommand) {}
}

/// Failures of a move sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Supply(#[from] SupplyError),

    #[error(transparent)]
    Guard(#[from] GuardError),
}

/// Summary of a completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub color: Color,
    pub removed: usize,
    pub fallen: usize,
    /// Cells placed by the refill, excluding any reshuffle.
    pub spawned: usize,
    pub reshuffles: u32,
}

/// Result of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The cell was empty or had no same-colored neighbor.
    NoOp,
    Cleared(MoveReport),
}

/// Sequences moves on one game session.
pub struct BoardController {
    config: GameConfig,
    grid: Grid,
    palette: Palette,
    /// Tile placed at each cell, indexed like the grid.
    slots: Vec<Option<TileId>>,
    guard: SolvabilityGuard,
    rng: SmallRng,
}

fn rng_from_seed(seed: u64) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_entropy()
    }
}

/// Places a tile in every empty cell, column by column from the bottom.
fn fill_empty<A: VisualAgent + ?Sized>(
    grid: &mut Grid,
    palette: &mut Palette,
    slots: &mut [Option<TileId>],
    animate: bool,
    agent: &mut A,
) -> Result<usize, SupplyError> {
    let empties: Vec<Coord> = grid.empty_coords().collect();
    let spawn_offset = grid.spawn_margin();
    for &at in &empties {
        let tile = palette.next()?;
        let color = palette.color(tile);
        let idx = grid.index(at);
        grid.cells_mut()[idx] = color;
        slots[idx] = Some(tile);
        agent.apply(VisualCommand::Spawn {
            at,
            color,
            spawn_offset,
            animate,
        });
    }
    Ok(empties.len())
}

/// Returns every placed tile to the pool.
fn release_slots<A: VisualAgent + ?Sized>(
    grid: &Grid,
    palette: &mut Palette,
    slots: &mut [Option<TileId>],
    agent: &mut A,
) {
    for (idx, slot) in slots.iter_mut().enumerate() {
        if let Some(tile) = slot.take() {
            palette.release(tile);
            agent.apply(VisualCommand::Remove { at: grid.coord_of(idx) });
        }
    }
}

impl BoardController {
    /// Creates a session with an empty board. Call [`start`](Self::start)
    /// to deal the first fill.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let margin = config.effective_spawn_margin();
        let grid = Grid::with_spawn_margin(config.width, config.height, margin);
        let palette = Palette::for_board(config.width, config.height, config.color_variants);
        Ok(BoardController {
            slots: vec![None; grid.cell_count()],
            guard: SolvabilityGuard::new(config.max_reshuffle_retries, config.min_region_size),
            rng: rng_from_seed(config.seed),
            config,
            grid,
            palette,
        })
    }

    /// Creates a session around an existing board, taken verbatim.
    ///
    /// The board's dimensions replace the configured ones and the palette
    /// grows to cover every color the board uses.
    pub fn with_board(mut config: GameConfig, board: Grid) -> Result<Self, ConfigError> {
        config.width = board.width();
        config.height = board.height();
        let used = board
            .cells()
            .iter()
            .filter_map(|c| REAL_COLORS.iter().position(|r| r == c))
            .max()
            .map_or(1, |i| i + 1);
        config.color_variants = config.color_variants.max(used);
        config.validate()?;

        let margin = config.effective_spawn_margin();
        let mut grid = Grid::with_spawn_margin(board.width(), board.height(), margin);
        grid.cells_mut().copy_from_slice(board.cells());
        let placed: Vec<Color> = grid.cells().iter().copied().filter(|c| c.is_real()).collect();
        let (palette, ids) = Palette::adopt(config.color_variants, &placed, grid.cell_count() * 2);

        let mut slots = vec![None; grid.cell_count()];
        let mut ids = ids.into_iter();
        for (slot, color) in slots.iter_mut().zip(grid.cells()) {
            if color.is_real() {
                *slot = ids.next();
            }
        }

        Ok(BoardController {
            slots,
            guard: SolvabilityGuard::new(config.max_reshuffle_retries, config.min_region_size),
            rng: rng_from_seed(config.seed),
            config,
            grid,
            palette,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The tile placed at `coord`, if any.
    pub fn tile_at(&self, coord: Coord) -> Option<TileId> {
        if !self.grid.is_in_bounds(coord) {
            return None;
        }
        self.slots[self.grid.index(coord)]
    }

    pub fn set_animate(&mut self, animate: bool) {
        self.config.animate = animate;
    }

    /// Deals a fresh board: shuffles the pool, fills every empty cell,
    /// guarantees a move and publishes tiers. Returns the reshuffle count.
    pub fn start<A: VisualAgent + ?Sized>(&mut self, agent: &mut A) -> Result<u32, MoveError> {
        self.palette.shuffle(&mut self.rng);
        fill_empty(&mut self.grid, &mut self.palette, &mut self.slots, self.config.animate, agent)?;
        let reshuffles = self.ensure_solvable(agent)?;
        self.publish_tiers(agent);
        Ok(reshuffles)
    }

    /// Whether clicking `coord` would remove anything.
    pub fn is_playable(&self, coord: Coord) -> Result<bool, GridError> {
        if self.config.min_region_size <= 2 {
            return Ok(!is_alone(&self.grid, coord)?);
        }
        match find_region(&self.grid, coord) {
            Ok(region) => Ok(region.len() >= self.config.min_region_size),
            Err(RegionError::EmptyCellSelected(_)) => Ok(false),
            Err(RegionError::Grid(e)) => Err(e),
        }
    }

    /// Runs the full move sequence for a click at `coord`.
    pub fn click<A: VisualAgent + ?Sized>(
        &mut self,
        coord: Coord,
        agent: &mut A,
    ) -> Result<MoveOutcome, MoveError> {
        if !self.is_playable(coord)? {
            debug!("click at {} ignored", coord);
            return Ok(MoveOutcome::NoOp);
        }
        let region = match find_region(&self.grid, coord) {
            Ok(r) => r,
            Err(RegionError::EmptyCellSelected(_)) => return Ok(MoveOutcome::NoOp),
            Err(RegionError::Grid(e)) => return Err(e.into()),
        };
        debug!("removing {} {} cells from {}", region.len(), region.color.name(), coord);

        let removed: Vec<Coord> = region.iter().collect();
        for &at in &removed {
            self.grid.clear(at)?;
            let idx = self.grid.index(at);
            if let Some(tile) = self.slots[idx].take() {
                self.palette.release(tile);
            }
            agent.apply(VisualCommand::Remove { at });
        }

        let plans = gravity::resolve(&mut self.grid, &removed)?;
        let mut fallen = 0;
        for plan in &plans {
            for fall in &plan.moves {
                let from = Coord::new(plan.column, fall.from_row);
                let to = Coord::new(plan.column, fall.to_row);
                let from_idx = self.grid.index(from);
                let to_idx = self.grid.index(to);
                self.slots[to_idx] = self.slots[from_idx].take();
                agent.apply(VisualCommand::Move {
                    from,
                    to,
                    color: self.grid.get(to)?,
                    animate: self.config.animate,
                });
                fallen += 1;
            }
        }

        let spawned = fill_empty(
            &mut self.grid,
            &mut self.palette,
            &mut self.slots,
            self.config.animate,
            agent,
        )?;
        let reshuffles = self.ensure_solvable(agent)?;
        self.publish_tiers(agent);

        Ok(MoveOutcome::Cleared(MoveReport {
            color: region.color,
            removed: removed.len(),
            fallen,
            spawned,
            reshuffles,
        }))
    }

    /// Reshuffles until the board has a move.
    fn ensure_solvable<A: VisualAgent + ?Sized>(
        &mut self,
        agent: &mut A,
    ) -> Result<u32, MoveError> {
        let BoardController {
            grid,
            palette,
            slots,
            guard,
            rng,
            config,
        } = self;
        let animate = config.animate;
        let reshuffles = guard.ensure(grid, |g| {
            release_slots(g, palette, slots, agent);
            palette.shuffle(rng);
            fill_empty(g, palette, slots, animate, agent).map(|_| ())
        })?;
        if reshuffles > 0 {
            agent.apply(VisualCommand::Reshuffle { count: reshuffles });
        }
        Ok(reshuffles)
    }

    /// Partition of the current board.
    pub fn partition(&self) -> BoardPartition {
        find_all_regions(&self.grid)
    }

    /// Number of regions a click would remove.
    pub fn playable_regions(&self) -> usize {
        self.partition().playable_count(self.config.min_region_size)
    }

    /// Sends the display tier of every cell.
    fn publish_tiers<A: VisualAgent + ?Sized>(&self, agent: &mut A) {
        for (at, tier) in tier_map(&self.partition(), &self.config.tier_thresholds) {
            agent.apply(VisualCommand::Tier { at, tier });
        }
    }
}
