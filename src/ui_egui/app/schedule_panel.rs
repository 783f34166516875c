//! Central panel: day navigation and the schedule canvas.

use super::TimeboxApp;
use crate::models::user::UserSession;
use crate::schedule::GestureCommit;
use crate::ui_egui::views::ScheduleView;
use chrono::NaiveDate;
use egui::RichText;

#[derive(Clone, Copy)]
enum NavAction {
    Today,
    Tomorrow,
    NextWeek,
    Previous,
    Next,
    Select(NaiveDate),
}

impl TimeboxApp {
    pub(super) fn render_schedule(&mut self, ctx: &egui::Context, session: &UserSession) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(nav) = self.render_navigation_row(ui) {
                self.apply_navigation(nav);
            }
            ui.separator();

            let date = self.navigation.selected();
            let key = self.navigation.schedule_key(&session.id);
            let blocks = self.store.blocks(&key).to_vec();

            if blocks.is_empty() && self.gestures.is_idle() {
                ui.label(
                    RichText::new("Drag on the grid to create a block, or drop a note from the sidebar.")
                        .weak()
                        .italics(),
                );
            }

            let output = ScheduleView::show(
                ui,
                date,
                &blocks,
                &mut self.gestures,
                self.state.selected_block,
            );

            if let Some(commit) = output.commit {
                self.apply_commit(session, commit);
            }
            if let Some((block_id, note_id)) = output.clicked_block {
                self.state.selected_block = Some(block_id);
                self.open_note(&session.id, note_id);
            }
        });
    }

    fn render_navigation_row(&self, ui: &mut egui::Ui) -> Option<NavAction> {
        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("◀").on_hover_text("Previous day").clicked() {
                action = Some(NavAction::Previous);
            }
            if ui.button("▶").on_hover_text("Next day").clicked() {
                action = Some(NavAction::Next);
            }
            ui.label(RichText::new(self.navigation.header_label()).strong().size(18.0));

            let mut picked = self.navigation.selected();
            ui.add(egui_extras::DatePickerButton::new(&mut picked).id_source("schedule_date_picker"));
            if picked != self.navigation.selected() {
                action = Some(NavAction::Select(picked));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Next Week").clicked() {
                    action = Some(NavAction::NextWeek);
                }
                if ui.button("Tomorrow").clicked() {
                    action = Some(NavAction::Tomorrow);
                }
                if ui
                    .add_enabled(!self.navigation.is_today_selected(), egui::Button::new("Today"))
                    .clicked()
                {
                    action = Some(NavAction::Today);
                }
            });
        });
        action
    }

    fn apply_navigation(&mut self, nav: NavAction) {
        let before = self.navigation.selected();
        match nav {
            NavAction::Today => self.navigation.go_today(),
            NavAction::Tomorrow => self.navigation.go_tomorrow(),
            NavAction::NextWeek => self.navigation.go_next_week(),
            NavAction::Previous => self.navigation.previous_day(),
            NavAction::Next => self.navigation.next_day(),
            NavAction::Select(date) => self.navigation.select(date),
        }
        let after = self.navigation.selected();
        if after != before {
            self.gestures.cancel();
            self.state.selected_block = None;
            self.state.expanded.reveal(after);
        }
    }

    fn apply_commit(&mut self, session: &UserSession, commit: GestureCommit) {
        let date = self.navigation.selected();
        match self.store.commit(&session.id, date, commit) {
            Ok(note_id) => {
                if let GestureCommit::CreateNote { .. } = commit {
                    self.state.selected_block = None;
                    self.open_note(&session.id, note_id);
                    self.toasts.success("Note created");
                }
            }
            Err(err) => self.toasts.error(format!("Could not save the change: {}", err)),
        }
    }
}
