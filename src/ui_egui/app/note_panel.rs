//! Right panel editing the open note.

use super::TimeboxApp;
use crate::models::user::UserSession;
use crate::services::billing::has_pro_access;
use egui::RichText;

enum NoteAction {
    Save,
    RemoveBlock(i64),
    DeleteNote(i64),
    Close,
}

impl TimeboxApp {
    pub(super) fn render_note_panel(&mut self, ctx: &egui::Context, session: &UserSession) {
        if self.state.editor.is_none() {
            return;
        }
        let is_pro = has_pro_access(self.store.subscription(&session.id));
        let selected_block = self.state.selected_block;
        let mut action = None;

        egui::SidePanel::right("note_panel")
            .default_width(320.0)
            .min_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                let Some(editor) = self.state.editor.as_mut() else {
                    return;
                };

                ui.add_space(6.0);
                ui.label(RichText::new("Title").weak());
                if ui
                    .add(egui::TextEdit::singleline(&mut editor.title).desired_width(f32::INFINITY))
                    .changed()
                {
                    editor.dirty = true;
                }
                ui.add_space(8.0);

                if is_pro {
                    ui.label(RichText::new("Notes").weak());
                    if ui
                        .add(
                            egui::TextEdit::multiline(&mut editor.content)
                                .desired_rows(14)
                                .desired_width(f32::INFINITY),
                        )
                        .changed()
                    {
                        editor.dirty = true;
                    }
                    ui.add_space(8.0);
                }

                ui.horizontal(|ui| {
                    if ui.add_enabled(editor.dirty, egui::Button::new("💾 Save")).clicked() {
                        action = Some(NoteAction::Save);
                    }
                    if let Some(block_id) = selected_block {
                        if ui.button("Remove time block").clicked() {
                            action = Some(NoteAction::RemoveBlock(block_id));
                        }
                    }
                });
                let note_id = editor.note_id;
                ui.horizontal(|ui| {
                    if ui.button("🗑 Delete note").clicked() {
                        action = Some(NoteAction::DeleteNote(note_id));
                    }
                    if ui.button("Close").clicked() {
                        action = Some(NoteAction::Close);
                    }
                });

                if !is_pro {
                    ui.add_space(12.0);
                    self.render_paywall(ui, session);
                }
            });

        if let Some(action) = action {
            self.apply_note_action(session, action);
        }
    }

    fn apply_note_action(&mut self, session: &UserSession, action: NoteAction) {
        match action {
            NoteAction::Save => {
                let Some(editor) = self.state.editor.as_mut() else {
                    return;
                };
                match self.store.update_note(&session.id, editor.note_id, &editor.draft()) {
                    Ok(_) => {
                        editor.dirty = false;
                        self.toasts.success("Note saved");
                    }
                    Err(err) => self.toasts.error(format!("Could not save note: {}", err)),
                }
            }
            NoteAction::RemoveBlock(block_id) => match self.store.delete_block(&session.id, block_id) {
                Ok(()) => {
                    self.state.selected_block = None;
                    self.toasts.info("Time block removed");
                }
                Err(err) => self.toasts.error(format!("Could not remove time block: {}", err)),
            },
            NoteAction::DeleteNote(note_id) => match self.store.delete_note(&session.id, note_id) {
                Ok(()) => {
                    self.state.editor = None;
                    self.state.selected_block = None;
                    self.toasts.info("Note deleted");
                }
                Err(err) => self.toasts.error(format!("Could not delete note: {}", err)),
            },
            NoteAction::Close => {
                self.state.editor = None;
                self.state.selected_block = None;
            }
        }
    }
}
