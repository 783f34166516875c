//! Overlap detection between a candidate range and the blocks already on a day.

use crate::models::time_block::{ScheduledBlock, TimeRange};

/// Half-open intersection: touching endpoints do not overlap.
pub fn ranges_overlap(a: TimeRange, b: TimeRange) -> bool {
    a.start < b.end && a.end > b.start
}

/// True when `candidate` intersects any block except `exclude` (the block
/// being moved or resized, if any).
pub fn overlaps_existing(
    candidate: TimeRange,
    existing: &[ScheduledBlock],
    exclude: Option<i64>,
) -> bool {
    existing
        .iter()
        .filter(|scheduled| Some(scheduled.id()) != exclude)
        .any(|scheduled| ranges_overlap(candidate, scheduled.range()))
}
