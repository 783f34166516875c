use chrono::{Local, NaiveDate, Timelike};
use egui::{Align2, CursorIcon, FontId, Pos2, Rect, Rounding, Sense, Stroke, Vec2};

use super::palette::SchedulePalette;
use crate::models::time_block::ScheduledBlock;
use crate::schedule::geometry::{
    hour_label, minute_to_offset, minutes_to_pixels, GRID_HEIGHT, WINDOW_END, WINDOW_START,
};
use crate::schedule::gesture::{DragPayload, GestureCommit, GestureController, ResizeEdge};

const GUTTER_WIDTH: f32 = 64.0;
/// Height of the grab zone at the top and bottom of a block.
const EDGE_GRAB: f32 = 6.0;
const BLOCK_INSET: f32 = 4.0;

/// What the user did on the canvas this frame.
#[derive(Debug, Default)]
pub struct ScheduleViewOutput {
    pub commit: Option<GestureCommit>,
    /// Block clicked without dragging.
    pub clicked_block: Option<(i64, i64)>,
}

#[derive(Debug, PartialEq)]
enum PointerTarget {
    Block { index: usize, edge: Option<ResizeEdge> },
    Empty,
}

pub struct ScheduleView;

impl ScheduleView {
    pub fn show(
        ui: &mut egui::Ui,
        date: NaiveDate,
        blocks: &[ScheduledBlock],
        gestures: &mut GestureController,
        selected_block: Option<i64>,
    ) -> ScheduleViewOutput {
        let mut output = ScheduleViewOutput::default();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                output = Self::render_canvas(ui, date, blocks, gestures, selected_block);
            });

        output
    }

    fn render_canvas(
        ui: &mut egui::Ui,
        date: NaiveDate,
        blocks: &[ScheduledBlock],
        gestures: &mut GestureController,
        selected_block: Option<i64>,
    ) -> ScheduleViewOutput {
        let palette = SchedulePalette::from_ui(ui);
        let width = ui.available_width().max(GUTTER_WIDTH + 120.0);
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(width, GRID_HEIGHT), Sense::click_and_drag());
        let lane = Rect::from_min_max(
            Pos2::new(rect.left() + GUTTER_WIDTH, rect.top()),
            rect.right_bottom(),
        );

        let mut output = ScheduleViewOutput::default();
        let local_y = |pos: Pos2| pos.y - rect.top();

        if ui.input(|i| i.key_pressed(egui::Key::Escape)) && !gestures.is_idle() {
            gestures.cancel();
        }

        // Pointer gestures on the canvas itself
        if response.drag_started() {
            let press_origin = ui.input(|i| i.pointer.press_origin());
            if let Some((target, pos)) =
                Self::drag_start(lane, blocks, press_origin, response.interact_pointer_pos())
            {
                match target {
                    PointerTarget::Block { index, edge: Some(edge) } => {
                        gestures.begin_resize(&blocks[index], edge, local_y(pos));
                    }
                    PointerTarget::Block { index, edge: None } => {
                        gestures.begin_move(&blocks[index], local_y(pos));
                    }
                    PointerTarget::Empty if lane.contains(pos) => {
                        gestures.begin_create(local_y(pos));
                    }
                    PointerTarget::Empty => {}
                }
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                gestures.pointer_moved(local_y(pos));
            }
        }

        if response.drag_stopped() {
            let released_inside = ui
                .input(|i| i.pointer.latest_pos())
                .is_some_and(|pos| rect.contains(pos));
            if released_inside {
                output.commit = gestures.release(blocks);
            } else {
                gestures.cancel();
            }
        }

        // Note cards dragged in from the sidebar
        if let Some(payload) = response.dnd_hover_payload::<DragPayload>() {
            if let (DragPayload::Note { note_id }, Some(pos)) = (*payload, response.hover_pos()) {
                gestures.hover_note(note_id, local_y(pos));
            }
        } else if egui::DragAndDrop::has_any_payload(ui.ctx()) {
            gestures.cancel_note_drag();
        } else {
            gestures.note_drag_ended();
        }
        if let Some(payload) = response.dnd_release_payload::<DragPayload>() {
            if matches!(*payload, DragPayload::Note { .. }) {
                output.commit = gestures.release(blocks);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let PointerTarget::Block { index, .. } = Self::target_at(lane, blocks, pos) {
                    let block = &blocks[index];
                    output.clicked_block = Some((block.id(), block.block.note_id));
                }
            }
        }

        if gestures.is_idle() {
            if let Some(pos) = response.hover_pos() {
                match Self::target_at(lane, blocks, pos) {
                    PointerTarget::Block { edge: Some(_), .. } => {
                        ui.ctx().set_cursor_icon(CursorIcon::ResizeVertical)
                    }
                    PointerTarget::Block { edge: None, .. } => {
                        ui.ctx().set_cursor_icon(CursorIcon::Grab)
                    }
                    PointerTarget::Empty => {}
                }
            }
        } else {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        }

        let painter = ui.painter_at(rect);
        Self::paint_grid(&painter, rect, lane, &palette);
        if date == Local::now().date_naive() {
            Self::paint_now_line(&painter, rect, lane, &palette);
        }

        let preview = gestures.preview(blocks);
        for block in blocks {
            let block_rect = Self::block_rect(lane, block);
            let is_previewed = preview.is_some_and(|p| p.block_id == Some(block.id()));
            if is_previewed {
                painter.rect_filled(block_rect, Rounding::same(6.0), palette.ghost_fill);
                continue;
            }
            let border = if selected_block == Some(block.id()) {
                palette.selected_border
            } else {
                palette.block_border
            };
            Self::paint_block(&painter, block_rect, block, &palette, border);
        }

        if let Some(preview) = preview {
            let span = minutes_to_pixels(preview.range);
            let preview_rect = Rect::from_min_max(
                Pos2::new(lane.left() + BLOCK_INSET, lane.top() + span.top),
                Pos2::new(lane.right() - BLOCK_INSET, lane.top() + span.bottom()),
            );
            let (fill, border) = if preview.conflict {
                (palette.conflict_fill, palette.conflict_border)
            } else {
                (palette.preview_fill, palette.preview_border)
            };
            painter.rect_filled(preview_rect, Rounding::same(6.0), fill);
            painter.rect_stroke(preview_rect, Rounding::same(6.0), Stroke::new(1.5, border));
            painter.text(
                preview_rect.left_top() + Vec2::new(8.0, 4.0),
                Align2::LEFT_TOP,
                preview.range.label(),
                FontId::proportional(12.0),
                palette.block_text,
            );
            ui.ctx().request_repaint();
        }

        output
    }

    /// egui reports a drag only after the pointer has travelled a few pixels,
    /// so the gesture is anchored where the button went down.
    fn drag_start(
        lane: Rect,
        blocks: &[ScheduledBlock],
        press_origin: Option<Pos2>,
        current: Option<Pos2>,
    ) -> Option<(PointerTarget, Pos2)> {
        let pos = press_origin.or(current)?;
        Some((Self::target_at(lane, blocks, pos), pos))
    }

    fn target_at(lane: Rect, blocks: &[ScheduledBlock], pos: Pos2) -> PointerTarget {
        // Later blocks paint on top, so search from the end.
        for (index, block) in blocks.iter().enumerate().rev() {
            let block_rect = Self::block_rect(lane, block);
            if !block_rect.contains(pos) {
                continue;
            }
            let edge = if pos.y - block_rect.top() <= EDGE_GRAB {
                Some(ResizeEdge::Top)
            } else if block_rect.bottom() - pos.y <= EDGE_GRAB {
                Some(ResizeEdge::Bottom)
            } else {
                None
            };
            return PointerTarget::Block { index, edge };
        }
        PointerTarget::Empty
    }

    fn block_rect(lane: Rect, block: &ScheduledBlock) -> Rect {
        let span = minutes_to_pixels(block.range());
        Rect::from_min_max(
            Pos2::new(lane.left() + BLOCK_INSET, lane.top() + span.top),
            Pos2::new(lane.right() - BLOCK_INSET, lane.top() + span.bottom()),
        )
    }

    fn paint_grid(painter: &egui::Painter, rect: Rect, lane: Rect, palette: &SchedulePalette) {
        painter.rect_filled(lane, Rounding::ZERO, palette.grid_bg);

        for hour in (WINDOW_START / 60)..=(WINDOW_END / 60) {
            let y = rect.top() + minute_to_offset(hour * 60);
            painter.hline(lane.x_range(), y, Stroke::new(1.0, palette.hour_line));
            if hour * 60 < WINDOW_END {
                let half = rect.top() + minute_to_offset(hour * 60 + 30);
                painter.hline(lane.x_range(), half, Stroke::new(1.0, palette.half_hour_line));
            }
            painter.text(
                Pos2::new(lane.left() - 8.0, y),
                Align2::RIGHT_CENTER,
                hour_label(hour),
                FontId::proportional(11.0),
                palette.hour_label,
            );
        }
    }

    fn paint_now_line(painter: &egui::Painter, rect: Rect, lane: Rect, palette: &SchedulePalette) {
        let now = Local::now().time();
        let minute = (now.hour() * 60 + now.minute()) as i32;
        if !(WINDOW_START..=WINDOW_END).contains(&minute) {
            return;
        }
        let y = rect.top() + minute_to_offset(minute);
        painter.hline(lane.x_range(), y, Stroke::new(2.0, palette.now_line));
        painter.circle_filled(Pos2::new(lane.left(), y), 4.0, palette.now_line);
    }

    fn paint_block(
        painter: &egui::Painter,
        block_rect: Rect,
        block: &ScheduledBlock,
        palette: &SchedulePalette,
        border: egui::Color32,
    ) {
        painter.rect_filled(block_rect, Rounding::same(6.0), palette.block_fill);
        painter.rect_stroke(block_rect, Rounding::same(6.0), Stroke::new(1.5, border));

        let title_pos = block_rect.left_top() + Vec2::new(8.0, 4.0);
        painter.text(
            title_pos,
            Align2::LEFT_TOP,
            block.note.display_title(),
            FontId::proportional(13.0),
            palette.block_text,
        );
        if block_rect.height() >= 36.0 {
            painter.text(
                title_pos + Vec2::new(0.0, 16.0),
                Align2::LEFT_TOP,
                block.range().label(),
                FontId::proportional(11.0),
                palette.hour_label,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::testing::scheduled;

    fn lane() -> Rect {
        Rect::from_min_max(Pos2::new(GUTTER_WIDTH, 0.0), Pos2::new(600.0, GRID_HEIGHT))
    }

    #[test]
    fn test_resize_grab_uses_press_origin() {
        let blocks = vec![scheduled(1, 540, 600)];
        let top = minute_to_offset(540);
        let pressed = Pos2::new(200.0, top + 2.0);
        let now = Pos2::new(200.0, top + 14.0);

        assert_eq!(
            ScheduleView::target_at(lane(), &blocks, now),
            PointerTarget::Block { index: 0, edge: None }
        );
        assert_eq!(
            ScheduleView::drag_start(lane(), &blocks, Some(pressed), Some(now)),
            Some((PointerTarget::Block { index: 0, edge: Some(ResizeEdge::Top) }, pressed))
        );
    }

    #[test]
    fn test_create_starts_where_button_went_down() {
        let blocks = vec![scheduled(1, 540, 600)];
        let pressed = Pos2::new(200.0, minute_to_offset(600) + 3.0);
        let now = Pos2::new(200.0, minute_to_offset(600) - 20.0);

        let (target, pos) =
            ScheduleView::drag_start(lane(), &blocks, Some(pressed), Some(now)).unwrap();
        assert_eq!(target, PointerTarget::Empty);
        assert_eq!(pos, pressed);
    }

    #[test]
    fn test_drag_start_falls_back_to_pointer() {
        let now = Pos2::new(200.0, 40.0);
        assert_eq!(
            ScheduleView::drag_start(lane(), &[], None, Some(now)),
            Some((PointerTarget::Empty, now))
        );
        assert_eq!(ScheduleView::drag_start(lane(), &[], None, None), None);
    }
}
