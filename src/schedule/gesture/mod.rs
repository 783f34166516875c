//! Pointer gesture state machines for the day schedule.
//!
//! Each gesture lives only between pointer-down and pointer-up (or cancel);
//! nothing is persisted until release, and release yields at most one
//! [`GestureCommit`]. The controller holds at most one gesture at a time, so a
//! second gesture cannot start while one is in progress.

pub mod create;
pub mod drag;
pub mod resize;

pub use create::CreateGesture;
pub use drag::{DragGesture, DragPayload};
pub use resize::{ResizeEdge, ResizeGesture};

use crate::models::time_block::{ScheduledBlock, TimeRange};

/// The single persistence action a finished gesture asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureCommit {
    /// Replace start and end of an existing block.
    UpdateBlock { block_id: i64, range: TimeRange },
    /// Create a blank note together with a block for it.
    CreateNote { range: TimeRange },
    /// Create a block for an existing note.
    ScheduleNote { note_id: i64, range: TimeRange },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActiveGesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
    Create(CreateGesture),
}

/// Uncommitted state shown while a gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GesturePreview {
    /// Block being moved or resized; `None` for new blocks.
    pub block_id: Option<i64>,
    pub range: TimeRange,
    /// The range would be rejected on release because it overlaps.
    pub conflict: bool,
}

/// Owner of the in-flight gesture for one schedule canvas.
#[derive(Debug, Default)]
pub struct GestureController {
    active: Option<ActiveGesture>,
    /// Note whose drag was cancelled with Escape; ignored until its card is let go.
    suppressed_note: Option<i64>,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        self.active.as_ref()
    }

    /// Start repositioning `block`. Returns false if another gesture is active.
    pub fn begin_move(&mut self, block: &ScheduledBlock, pointer_y: f32) -> bool {
        self.begin(ActiveGesture::Drag(DragGesture::for_block(block, pointer_y)))
    }

    pub fn begin_resize(&mut self, block: &ScheduledBlock, edge: ResizeEdge, pointer_y: f32) -> bool {
        self.begin(ActiveGesture::Resize(ResizeGesture::new(block, edge, pointer_y)))
    }

    /// Start drag-to-create on empty grid space.
    pub fn begin_create(&mut self, pointer_y: f32) -> bool {
        self.begin(ActiveGesture::Create(CreateGesture::new(pointer_y)))
    }

    /// A note card is hovering over the grid: start a note drag or track it.
    pub fn hover_note(&mut self, note_id: i64, pointer_y: f32) {
        if self.suppressed_note == Some(note_id) {
            return;
        }
        match &mut self.active {
            Some(ActiveGesture::Drag(drag))
                if drag.payload() == (DragPayload::Note { note_id }) =>
            {
                drag.update(pointer_y);
            }
            Some(_) => {}
            None => {
                self.active = Some(ActiveGesture::Drag(DragGesture::for_note(note_id, pointer_y)));
            }
        }
    }

    pub fn pointer_moved(&mut self, pointer_y: f32) {
        match &mut self.active {
            Some(ActiveGesture::Drag(drag)) => drag.update(pointer_y),
            Some(ActiveGesture::Resize(resize)) => resize.update(pointer_y),
            Some(ActiveGesture::Create(create)) => create.update(pointer_y),
            None => {}
        }
    }

    pub fn preview(&self, existing: &[ScheduledBlock]) -> Option<GesturePreview> {
        let preview = match self.active.as_ref()? {
            ActiveGesture::Drag(drag) => GesturePreview {
                block_id: match drag.payload() {
                    DragPayload::TimeBlock { block_id, .. } => Some(block_id),
                    DragPayload::Note { .. } => None,
                },
                range: drag.preview_range(),
                conflict: drag.has_conflict(existing),
            },
            ActiveGesture::Resize(resize) => GesturePreview {
                block_id: Some(resize.block_id()),
                range: resize.preview_range(),
                conflict: false,
            },
            ActiveGesture::Create(create) => GesturePreview {
                block_id: None,
                range: create.candidate_range(),
                conflict: create.has_conflict(existing),
            },
        };
        Some(preview)
    }

    /// Pointer released: finish the gesture and return to idle.
    pub fn release(&mut self, existing: &[ScheduledBlock]) -> Option<GestureCommit> {
        match self.active.take()? {
            ActiveGesture::Drag(drag) => drag.finish(existing),
            ActiveGesture::Resize(resize) => resize.finish(),
            ActiveGesture::Create(create) => create.finish(existing),
        }
    }

    /// Abandon the gesture without committing anything.
    ///
    /// A cancelled note drag stays cancelled while the card is still held:
    /// further hovers of that note are ignored until [`Self::note_drag_ended`].
    pub fn cancel(&mut self) {
        if let Some(DragPayload::Note { note_id }) = self.note_drag() {
            self.suppressed_note = Some(note_id);
        }
        self.abandon();
    }

    /// Drop a note drag whose card left the canvas.
    pub fn cancel_note_drag(&mut self) {
        if self.note_drag().is_some() {
            self.abandon();
        }
    }

    /// No note card is held any more.
    pub fn note_drag_ended(&mut self) {
        self.cancel_note_drag();
        self.suppressed_note = None;
    }

    fn note_drag(&self) -> Option<DragPayload> {
        match &self.active {
            Some(ActiveGesture::Drag(drag)) if matches!(drag.payload(), DragPayload::Note { .. }) => {
                Some(drag.payload())
            }
            _ => None,
        }
    }

    fn abandon(&mut self) {
        if let Some(gesture) = self.active.take() {
            log::debug!("Gesture cancelled: {:?}", gesture);
        }
    }

    fn begin(&mut self, gesture: ActiveGesture) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(gesture);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::geometry::{minute_to_offset, PIXELS_PER_MINUTE};
    use crate::schedule::testing::scheduled;

    #[test]
    fn test_controller_is_idle_by_default() {
        let controller = GestureController::new();
        assert!(controller.is_idle());
        assert!(controller.preview(&[]).is_none());
    }

    #[test]
    fn test_second_gesture_cannot_start() {
        let block = scheduled(1, 540, 600);
        let mut controller = GestureController::new();
        assert!(controller.begin_move(&block, 10.0));
        assert!(!controller.begin_create(500.0));
        assert!(!controller.begin_resize(&block, ResizeEdge::Top, 10.0));
        assert!(matches!(controller.active(), Some(ActiveGesture::Drag(_))));
    }

    #[test]
    fn test_cancel_returns_to_idle_without_commit() {
        let block = scheduled(1, 540, 600);
        let mut controller = GestureController::new();
        controller.begin_resize(&block, ResizeEdge::Bottom, 0.0);
        controller.pointer_moved(60.0 * PIXELS_PER_MINUTE);
        controller.cancel();

        assert!(controller.is_idle());
        assert_eq!(controller.release(&[block]), None);
    }

    #[test]
    fn test_preview_tracks_pointer_then_release_commits_once() {
        let block = scheduled(1, 540, 600);
        let mut controller = GestureController::new();
        controller.begin_move(&block, 0.0);
        controller.pointer_moved(15.0 * PIXELS_PER_MINUTE);
        controller.pointer_moved(45.0 * PIXELS_PER_MINUTE);

        let preview = controller.preview(&[block.clone()]).unwrap();
        assert_eq!(preview.block_id, Some(1));
        assert_eq!(preview.range, TimeRange { start: 585, end: 645 });
        assert!(!preview.conflict);

        let commit = controller.release(&[block.clone()]);
        assert_eq!(
            commit,
            Some(GestureCommit::UpdateBlock {
                block_id: 1,
                range: TimeRange { start: 585, end: 645 },
            })
        );
        assert!(controller.is_idle());
        assert_eq!(controller.release(&[block]), None);
    }

    #[test]
    fn test_create_preview_flags_conflict() {
        let existing = vec![scheduled(1, 540, 600)];
        let mut controller = GestureController::new();
        controller.begin_create(minute_to_offset(9 * 60 + 15));
        controller.pointer_moved(minute_to_offset(9 * 60 + 45));

        let preview = controller.preview(&existing).unwrap();
        assert!(preview.conflict);
        assert_eq!(preview.block_id, None);
        assert_eq!(controller.release(&existing), None);
    }

    #[test]
    fn test_note_hover_tracks_and_cancels_when_leaving() {
        let mut controller = GestureController::new();
        controller.hover_note(9, minute_to_offset(8 * 60));
        controller.hover_note(9, minute_to_offset(13 * 60));
        assert_eq!(
            controller.preview(&[]).map(|p| p.range),
            Some(TimeRange { start: 780, end: 840 })
        );

        controller.cancel_note_drag();
        assert!(controller.is_idle());
    }

    #[test]
    fn test_escape_keeps_note_drag_cancelled_until_card_is_let_go() {
        let mut controller = GestureController::new();
        controller.hover_note(9, minute_to_offset(10 * 60));
        controller.cancel();

        controller.hover_note(9, minute_to_offset(11 * 60));
        assert!(controller.is_idle());
        assert_eq!(controller.release(&[]), None);

        controller.hover_note(4, minute_to_offset(11 * 60));
        assert!(!controller.is_idle());
        controller.cancel_note_drag();

        controller.note_drag_ended();
        controller.hover_note(9, minute_to_offset(12 * 60));
        assert_eq!(
            controller.release(&[]),
            Some(GestureCommit::ScheduleNote {
                note_id: 9,
                range: TimeRange { start: 720, end: 780 },
            })
        );
    }

    #[test]
    fn test_leaving_canvas_does_not_suppress_note() {
        let mut controller = GestureController::new();
        controller.hover_note(9, minute_to_offset(10 * 60));
        controller.cancel_note_drag();
        controller.hover_note(9, minute_to_offset(10 * 60));
        assert!(!controller.is_idle());
    }

    #[test]
    fn test_note_hover_does_not_interrupt_block_gesture() {
        let block = scheduled(1, 540, 600);
        let mut controller = GestureController::new();
        controller.begin_move(&block, 0.0);
        controller.hover_note(9, 100.0);
        controller.cancel_note_drag();

        assert!(matches!(
            controller.active(),
            Some(ActiveGesture::Drag(drag)) if matches!(drag.payload(), DragPayload::TimeBlock { .. })
        ));
    }
}
