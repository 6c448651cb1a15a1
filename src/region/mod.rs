//! Region discovery.
//!
//! Flood-fill lookup of a single region, the whole-board partition, the
//! constant-time "alone" shortcut, and display-tier classification.

pub mod finder;
pub mod tier;

pub use finder::{find_all_regions, find_region, is_alone, BoardPartition, Region, RegionError};
pub use tier::{classify_tier, tier_map, DEFAULT_TIER_THRESHOLDS};
