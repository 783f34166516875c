//! Left panel: "New Note", the upcoming-days tree and draggable note cards.

use super::state::NoteEditor;
use super::TimeboxApp;
use crate::models::user::UserSession;
use crate::schedule::date_tree::{build_date_tree, count_blocks_by_date, tree_range, YearNode};
use crate::schedule::gesture::DragPayload;
use egui::RichText;

const SIDEBAR_MIN_WIDTH: f32 = 200.0;
const SIDEBAR_DEFAULT_WIDTH: f32 = 240.0;
const SIDEBAR_MAX_WIDTH: f32 = 360.0;

/// Things the user asked for while the panel was borrowed.
enum SidebarAction {
    NewNote,
    ToggleNode(String),
    SelectDate(chrono::NaiveDate),
    OpenNote(i64),
}

impl TimeboxApp {
    pub(super) fn render_sidebar(&mut self, ctx: &egui::Context, session: &UserSession) {
        let mut actions = Vec::new();

        egui::SidePanel::left("sidebar")
            .default_width(SIDEBAR_DEFAULT_WIDTH)
            .min_width(SIDEBAR_MIN_WIDTH)
            .max_width(SIDEBAR_MAX_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                if ui
                    .add_sized([ui.available_width(), 28.0], egui::Button::new("➕ New Note"))
                    .clicked()
                {
                    actions.push(SidebarAction::NewNote);
                }
                ui.add_space(6.0);
                ui.separator();

                let (start, end) = tree_range(self.navigation.today());
                let counts = count_blocks_by_date(self.store.block_dates(&session.id, start, end));
                let tree = build_date_tree(start, end, &counts);

                egui::ScrollArea::vertical()
                    .id_source("date_tree_scroll")
                    .max_height(ui.available_height() * 0.55)
                    .show(ui, |ui| {
                        self.render_date_tree(ui, &tree, &mut actions);
                    });

                ui.add_space(6.0);
                ui.separator();
                ui.label(RichText::new("Notes").strong());
                ui.label(RichText::new("Drag a note onto the schedule").weak().small());
                ui.add_space(4.0);

                egui::ScrollArea::vertical()
                    .id_source("note_cards_scroll")
                    .show(ui, |ui| {
                        self.render_note_cards(ui, session, &mut actions);
                    });
            });

        for action in actions {
            self.apply_sidebar_action(session, action);
        }
    }

    fn render_date_tree(&self, ui: &mut egui::Ui, tree: &[YearNode], actions: &mut Vec<SidebarAction>) {
        let selected = self.navigation.selected();
        let expanded = &self.state.expanded;

        for year in tree {
            let open = expanded.is_open(&year.key);
            if ui
                .selectable_label(false, RichText::new(format!("{} {}", arrow(open), year.key)).strong())
                .clicked()
            {
                actions.push(SidebarAction::ToggleNode(year.key.clone()));
            }
            if !open {
                continue;
            }

            for month in &year.months {
                let open = expanded.is_open(&month.key);
                ui.horizontal(|ui| {
                    ui.add_space(12.0);
                    if ui
                        .selectable_label(false, format!("{} {}", arrow(open), month.label))
                        .clicked()
                    {
                        actions.push(SidebarAction::ToggleNode(month.key.clone()));
                    }
                });
                if !open {
                    continue;
                }

                for day in &month.days {
                    ui.horizontal(|ui| {
                        ui.add_space(28.0);
                        let text = if day.count > 0 {
                            format!("{}  ({})", day.label, day.count)
                        } else {
                            day.label.clone()
                        };
                        if ui.selectable_label(day.date == selected, text).clicked() {
                            actions.push(SidebarAction::SelectDate(day.date));
                        }
                    });
                }
            }
        }
    }

    fn render_note_cards(
        &mut self,
        ui: &mut egui::Ui,
        session: &UserSession,
        actions: &mut Vec<SidebarAction>,
    ) {
        let open_note = self.state.editor.as_ref().map(|editor| editor.note_id);
        let notes = self.store.notes(&session.id);

        if notes.is_empty() {
            ui.label(RichText::new("No notes yet").weak().italics());
            return;
        }

        for note in notes {
            let note_id = note.id;
            let title = note.display_title().to_string();
            let response = ui
                .dnd_drag_source(
                    egui::Id::new(("note_card", note_id)),
                    DragPayload::Note { note_id },
                    |ui| ui.selectable_label(open_note == Some(note_id), format!("📝 {}", title)),
                )
                .inner;
            if response.clicked() {
                actions.push(SidebarAction::OpenNote(note_id));
            }
        }
    }

    fn apply_sidebar_action(&mut self, session: &UserSession, action: SidebarAction) {
        match action {
            SidebarAction::NewNote => {
                let date = self.navigation.selected();
                match self.store.create_note_with_default_block(&session.id, date) {
                    Ok(scheduled) => {
                        self.state.expanded.reveal(date);
                        self.state.selected_block = Some(scheduled.id());
                        self.state.editor = Some(NoteEditor::from_note(&scheduled.note));
                        self.toasts.success("Note created");
                    }
                    Err(err) => self.toasts.error(format!("Could not create note: {}", err)),
                }
            }
            SidebarAction::ToggleNode(key) => self.state.expanded.toggle(&key),
            SidebarAction::SelectDate(date) => self.select_date(date),
            SidebarAction::OpenNote(note_id) => self.open_note(&session.id, note_id),
        }
    }
}

fn arrow(open: bool) -> &'static str {
    if open {
        "▾"
    } else {
        "▸"
    }
}
