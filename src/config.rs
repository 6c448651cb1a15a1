//! Session configuration.
//!
//! Board dimensions, palette size and the tunables of the move sequence.
//! Loaded from JSON (every field optional) or assembled from protocol
//! `setoption` commands, then validated before a session starts.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::board::MAX_COLOR_VARIANTS;
use crate::region::DEFAULT_TIER_THRESHOLDS;
use crate::resolve::DEFAULT_MAX_RESHUFFLES;

/// Allowed board width and height.
pub const MIN_BOARD_DIM: usize = 2;
pub const MAX_BOARD_DIM: usize = 10;

/// Rows added above the board height for the default spawn margin.
pub const EXTRA_SPAWN_ROWS: f32 = 3.0;

/// Errors produced while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be in {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("spawn_margin must be a finite non-negative number, got {0}")]
    BadSpawnMargin(f32),

    #[error("max_reshuffle_retries must be at least 1")]
    NoReshuffles,

    #[error("tier thresholds must be strictly increasing, got {0:?}")]
    BadTierThresholds([usize; 3]),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters of a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Number of distinct real colors in play.
    pub color_variants: usize,
    /// Rows above the board from which new cells spawn. Defaults to
    /// `height + 3`.
    pub spawn_margin: Option<f32>,
    pub min_region_size: usize,
    pub max_reshuffle_retries: u32,
    pub tier_thresholds: [usize; 3],
    /// Whether falls and spawns are eased or instantaneous.
    pub animate: bool,
    /// RNG seed; 0 draws from entropy.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 5,
            height: 5,
            color_variants: 5,
            spawn_margin: None,
            min_region_size: 2,
            max_reshuffle_retries: DEFAULT_MAX_RESHUFFLES,
            tier_thresholds: DEFAULT_TIER_THRESHOLDS,
            animate: true,
            seed: 0,
        }
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl GameConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        GameConfig::from_json(&text)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("width", self.width, MIN_BOARD_DIM, MAX_BOARD_DIM)?;
        check_range("height", self.height, MIN_BOARD_DIM, MAX_BOARD_DIM)?;
        check_range("color_variants", self.color_variants, 1, MAX_COLOR_VARIANTS)?;
        check_range("min_region_size", self.min_region_size, 2, self.width * self.height)?;
        if let Some(margin) = self.spawn_margin {
            if !margin.is_finite() || margin < 0.0 {
                return Err(ConfigError::BadSpawnMargin(margin));
            }
        }
        if self.max_reshuffle_retries == 0 {
            return Err(ConfigError::NoReshuffles);
        }
        let [a, b, c] = self.tier_thresholds;
        if !(a < b && b < c) {
            return Err(ConfigError::BadTierThresholds(self.tier_thresholds));
        }
        Ok(())
    }

    /// The spawn margin to use, clamped up to the board height.
    pub fn effective_spawn_margin(&self) -> f32 {
        let height = self.height as f32;
        match self.spawn_margin {
            None => height + EXTRA_SPAWN_ROWS,
            Some(m) if m < height => {
                warn!("spawn margin {} is below board height {}; clamping", m, height);
                height
            }
            Some(m) => m,
        }
    }
}
