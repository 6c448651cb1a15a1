//! Tile supply.
//!
//! A fixed arena of tiles, twice the board size, from which every placed
//! cell draws its color. Tile `i` is colored `REAL_COLORS[i % variants]`,
//! so each configured color makes up an equal share of the pool. Draws walk
//! the pool round-robin: active tiles rotate to the back and the first
//! inactive tile is handed out. Shuffling the draw order is what makes a
//! fresh fill random.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Color, MAX_COLOR_VARIANTS, REAL_COLORS};

/// Raised when every tile in the pool is already on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SupplyError {
    #[error("tile supply exhausted: all {pool_size} tiles are placed")]
    Exhausted { pool_size: usize },
}

/// Index of a tile in the palette arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

#[derive(Debug, Clone)]
struct Tile {
    color: Color,
    active: bool,
}

/// Pooled tile supply.
#[derive(Debug, Clone)]
pub struct Palette {
    tiles: Vec<Tile>,
    order: VecDeque<TileId>,
}

impl Palette {
    /// Creates a pool of `capacity` inactive tiles over `color_variants`
    /// colors (clamped to 1..=6).
    pub fn new(color_variants: usize, capacity: usize) -> Self {
        let variants = color_variants.clamp(1, MAX_COLOR_VARIANTS);
        let tiles = (0..capacity)
            .map(|i| Tile {
                color: REAL_COLORS[i % variants],
                active: false,
            })
            .collect();
        Palette {
            tiles,
            order: (0..capacity).map(TileId).collect(),
        }
    }

    /// Creates a pool sized for a `width × height` board.
    pub fn for_board(width: usize, height: usize, color_variants: usize) -> Self {
        Palette::new(color_variants, width * height * 2)
    }

    /// Builds a pool around cells that are already placed.
    ///
    /// One active tile is created per entry of `placed`, in order, followed
    /// by `spare` inactive tiles colored round-robin over `color_variants`.
    /// Returns the pool and the ids of the placed tiles.
    pub fn adopt(color_variants: usize, placed: &[Color], spare: usize) -> (Self, Vec<TileId>) {
        let variants = color_variants.clamp(1, MAX_COLOR_VARIANTS);
        let mut tiles: Vec<Tile> = placed
            .iter()
            .map(|&color| Tile {
                color,
                active: true,
            })
            .collect();
        tiles.extend((0..spare).map(|i| Tile {
            color: REAL_COLORS[i % variants],
            active: false,
        }));
        let ids = (0..placed.len()).map(TileId).collect();
        let order = (0..tiles.len()).map(TileId).collect();
        (Palette { tiles, order }, ids)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles currently placed.
    pub fn active_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.active).count()
    }

    pub fn color(&self, id: TileId) -> Color {
        self.tiles[id.0].color
    }

    pub fn is_active(&self, id: TileId) -> bool {
        self.tiles[id.0].active
    }

    /// Activates and returns the next free tile.
    pub fn next(&mut self) -> Result<TileId, SupplyError> {
        for _ in 0..self.order.len() {
            let Some(id) = self.order.pop_front() else {
                break;
            };
            self.order.push_back(id);
            let tile = &mut self.tiles[id.0];
            if !tile.active {
                tile.active = true;
                return Ok(id);
            }
        }
        Err(SupplyError::Exhausted {
            pool_size: self.tiles.len(),
        })
    }

    /// Returns a tile to the pool.
    pub fn release(&mut self, id: TileId) {
        self.tiles[id.0].active = false;
    }

    /// Returns every tile to the pool.
    pub fn release_all(&mut self) {
        for tile in &mut self.tiles {
            tile.active = false;
        }
    }

    /// Randomizes the draw order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.make_contiguous().shuffle(rng);
    }
}
