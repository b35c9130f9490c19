//! # Innate Primitives
//!
//! Compiled-in constants for the catalog.
//!
//! ## Primitives
//!
//! 1. **Bucket Floor**: initial bucket count of every `KeyStore`, and the
//!    size below which a store never shrinks.
//! 2. **Growth Factor**: a full store doubles its bucket count.
//! 3. **Shrink Divisor**: a store whose occupancy drops to a quarter of its
//!    bucket count halves it.

/// Default initial bucket count and shrink floor of a `KeyStore`.
pub const INITIAL_BUCKETS: usize = 17;

/// Multiplier applied to the bucket count when a store fills up.
///
/// - Growth triggers when occupancy reaches the bucket count on insert.
pub const GROWTH_FACTOR: usize = 2;

/// Occupancy ratio that triggers a shrink on removal.
///
/// - Shrink triggers when `len <= buckets / SHRINK_DIVISOR`.
/// - The new bucket count is `buckets / GROWTH_FACTOR`, clamped to the floor.
pub const SHRINK_DIVISOR: usize = 4;

/// Change-count increment recorded by one genre merge.
pub const MERGE_EVENT: i64 = 1;
