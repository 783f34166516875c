//! Edge-resize gesture.
//!
//! Dragging the top edge moves the start, dragging the bottom edge moves the
//! end. The pointer delta is snapped first and clamped against the edge being
//! moved, so the block never shrinks below [`MIN_DURATION`] nor leaves the
//! window.

use crate::models::time_block::{ScheduledBlock, TimeRange};
use crate::schedule::geometry::{pixel_delta_to_minutes, MIN_DURATION, WINDOW_END, WINDOW_START};

use super::GestureCommit;

/// Which edge of the block is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    /// Adjusts the start time
    Top,
    /// Adjusts the end time
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    block_id: i64,
    edge: ResizeEdge,
    original: TimeRange,
    origin_y: f32,
    current_y: f32,
}

impl ResizeGesture {
    pub fn new(block: &ScheduledBlock, edge: ResizeEdge, pointer_y: f32) -> Self {
        Self {
            block_id: block.id(),
            edge,
            original: block.range(),
            origin_y: pointer_y,
            current_y: pointer_y,
        }
    }

    pub fn block_id(&self) -> i64 {
        self.block_id
    }

    pub fn update(&mut self, pointer_y: f32) {
        self.current_y = pointer_y;
    }

    pub fn preview_range(&self) -> TimeRange {
        let delta = pixel_delta_to_minutes(self.current_y - self.origin_y);
        resized_range(self.original, self.edge, delta)
    }

    pub fn finish(self) -> Option<GestureCommit> {
        let range = self.preview_range();
        if range == self.original {
            return None;
        }
        Some(GestureCommit::UpdateBlock {
            block_id: self.block_id,
            range,
        })
    }
}

/// Apply a snapped `delta` to one edge of `original`.
pub fn resized_range(original: TimeRange, edge: ResizeEdge, delta: i32) -> TimeRange {
    match edge {
        ResizeEdge::Top => TimeRange {
            start: (original.start + delta)
                .min(original.end - MIN_DURATION)
                .max(WINDOW_START),
            end: original.end,
        },
        ResizeEdge::Bottom => TimeRange {
            start: original.start,
            end: (original.end + delta)
                .max(original.start + MIN_DURATION)
                .min(WINDOW_END),
        },
    }
}
