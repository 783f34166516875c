//! Drag-to-create gesture on empty grid space.

use crate::models::time_block::{ScheduledBlock, TimeRange};
use crate::schedule::geometry::{pixel_to_minutes, MIN_DURATION, WINDOW_END};
use crate::schedule::overlap::overlaps_existing;

use super::GestureCommit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGesture {
    anchor: i32,
    current: i32,
}

impl CreateGesture {
    pub fn new(pointer_y: f32) -> Self {
        let anchor = pixel_to_minutes(pointer_y);
        Self {
            anchor,
            current: anchor,
        }
    }

    pub fn update(&mut self, pointer_y: f32) {
        self.current = pixel_to_minutes(pointer_y);
    }

    pub fn candidate_range(&self) -> TimeRange {
        span_with_minimum(self.anchor, self.current)
    }

    pub fn has_conflict(&self, existing: &[ScheduledBlock]) -> bool {
        overlaps_existing(self.candidate_range(), existing, None)
    }

    /// Overlapping candidates are discarded without a commit.
    pub fn finish(self, existing: &[ScheduledBlock]) -> Option<GestureCommit> {
        let range = self.candidate_range();
        if overlaps_existing(range, existing, None) {
            log::info!("Discarding new block {}: overlaps an existing block", range.label());
            return None;
        }
        Some(GestureCommit::CreateNote { range })
    }
}

/// Order the two endpoints and pad short spans to [`MIN_DURATION`], pushing
/// the start back instead when the window end is in the way.
pub fn span_with_minimum(a: i32, b: i32) -> TimeRange {
    let mut start = a.min(b);
    let mut end = a.max(b);
    if end - start < MIN_DURATION {
        end = start + MIN_DURATION;
        if end > WINDOW_END {
            end = WINDOW_END;
            start = WINDOW_END - MIN_DURATION;
        }
    }
    TimeRange { start, end }
}
