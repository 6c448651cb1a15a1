//! Display tiers.
//!
//! After a move settles, each region is tagged with a tier by size so the
//! presentation layer can pick a sprite variant. Tiers never affect grid
//! state.

use crate::board::Coord;

use super::finder::BoardPartition;

/// Region-size boundaries between tiers 0|1, 1|2 and 2|3.
pub const DEFAULT_TIER_THRESHOLDS: [usize; 3] = [5, 8, 10];

/// Returns the display tier (0..=3) for a region of `size` cells.
pub fn classify_tier(size: usize, thresholds: &[usize; 3]) -> u8 {
    thresholds
        .iter()
        .position(|&t| size < t)
        .unwrap_or(thresholds.len()) as u8
}

/// Tier of every occupied cell, ordered by coordinate.
pub fn tier_map(partition: &BoardPartition, thresholds: &[usize; 3]) -> Vec<(Coord, u8)> {
    let mut tiers: Vec<(Coord, u8)> = partition
        .regions()
        .iter()
        .flat_map(|region| {
            let tier = classify_tier(region.len(), thresholds);
            region.iter().map(move |c| (c, tier))
        })
        .collect();
    tiers.sort_unstable_by_key(|(c, _)| *c);
    tiers
}
