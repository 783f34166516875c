//! Drag-move gesture.
//!
//! A drag carries a [`DragPayload`] chosen when the gesture starts: either an
//! existing time block being repositioned, or a note card dropped onto the
//! grid to schedule it. Intermediate pointer samples only move the preview.

use crate::models::time_block::{ScheduledBlock, TimeRange};
use crate::schedule::geometry::{pixel_delta_to_minutes, pixel_to_minutes, WINDOW_END, WINDOW_START};
use crate::schedule::overlap::overlaps_existing;

use super::GestureCommit;

/// Length of the block created when a note card is dropped on the grid.
pub const NOTE_DROP_DURATION: i32 = 60;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    TimeBlock { block_id: i64, original: TimeRange },
    Note { note_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    payload: DragPayload,
    origin_y: f32,
    current_y: f32,
}

impl DragGesture {
    pub fn for_block(block: &ScheduledBlock, pointer_y: f32) -> Self {
        Self {
            payload: DragPayload::TimeBlock {
                block_id: block.id(),
                original: block.range(),
            },
            origin_y: pointer_y,
            current_y: pointer_y,
        }
    }

    pub fn for_note(note_id: i64, pointer_y: f32) -> Self {
        Self {
            payload: DragPayload::Note { note_id },
            origin_y: pointer_y,
            current_y: pointer_y,
        }
    }

    pub fn payload(&self) -> DragPayload {
        self.payload
    }

    pub fn update(&mut self, pointer_y: f32) {
        self.current_y = pointer_y;
    }

    /// Snapped minutes travelled since the pointer went down.
    pub fn delta_minutes(&self) -> i32 {
        pixel_delta_to_minutes(self.current_y - self.origin_y)
    }

    /// Range the dragged item would occupy if released now.
    pub fn preview_range(&self) -> TimeRange {
        match self.payload {
            DragPayload::TimeBlock { original, .. } => moved_range(original, self.delta_minutes()),
            DragPayload::Note { .. } => note_drop_range(self.current_y),
        }
    }

    /// Block moves never check for conflicts; note drops create a block and
    /// therefore follow the creation rule.
    pub fn has_conflict(&self, existing: &[ScheduledBlock]) -> bool {
        match self.payload {
            DragPayload::TimeBlock { .. } => false,
            DragPayload::Note { .. } => overlaps_existing(self.preview_range(), existing, None),
        }
    }

    /// Resolve the gesture on pointer release.
    pub fn finish(self, existing: &[ScheduledBlock]) -> Option<GestureCommit> {
        let range = self.preview_range();
        match self.payload {
            DragPayload::TimeBlock { block_id, original } => {
                if range == original {
                    return None;
                }
                Some(GestureCommit::UpdateBlock { block_id, range })
            }
            DragPayload::Note { note_id } => {
                if overlaps_existing(range, existing, None) {
                    log::info!(
                        "Discarding drop of note {} at {}: overlaps an existing block",
                        note_id,
                        range.label()
                    );
                    return None;
                }
                Some(GestureCommit::ScheduleNote { note_id, range })
            }
        }
    }
}

/// Shift `original` by `delta` minutes, keeping its duration and keeping the
/// whole block inside the window.
pub fn moved_range(original: TimeRange, delta: i32) -> TimeRange {
    let duration = original.duration();
    let start = (original.start + delta)
        .min(WINDOW_END - duration)
        .max(WINDOW_START);
    TimeRange {
        start,
        end: start + duration,
    }
}

/// Hour-long slot beginning at the snapped minute under the pointer.
pub fn note_drop_range(pointer_y: f32) -> TimeRange {
    let start = pixel_to_minutes(pointer_y).min(WINDOW_END - NOTE_DROP_DURATION);
    TimeRange {
        start,
        end: start + NOTE_DROP_DURATION,
    }
}
