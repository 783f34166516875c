mod auth_panel;
mod header;
mod lifecycle;
mod note_panel;
mod paywall;
mod schedule_panel;
mod sidebar;
mod state;
mod toast;

use self::state::{AppState, NoteEditor};
use self::toast::ToastManager;
use crate::models::user::UserSession;
use crate::schedule::{DayNavigation, GestureController, ScheduleStore};
use crate::services::auth::{AuthService, HostedIdentity};
use crate::services::backend::SqliteBackend;
use crate::services::config::AppConfig;

/// Owner id used when no identity provider is configured.
pub const LOCAL_USER_ID: &str = "local";

pub struct TimeboxApp {
    config: AppConfig,
    store: ScheduleStore<SqliteBackend>,
    /// `None` runs the app against a single local profile.
    auth: Option<AuthService<HostedIdentity>>,
    local_session: Option<UserSession>,
    navigation: DayNavigation,
    gestures: GestureController,
    state: AppState,
    toasts: ToastManager,
}

impl eframe::App for TimeboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_update(ctx);
    }
}

impl TimeboxApp {
    fn session(&self) -> Option<UserSession> {
        match &self.auth {
            Some(auth) => auth.current_session().cloned(),
            None => self.local_session.clone(),
        }
    }

    fn select_date(&mut self, date: chrono::NaiveDate) {
        if date != self.navigation.selected() {
            self.gestures.cancel();
            self.state.selected_block = None;
        }
        self.navigation.select(date);
        self.state.expanded.reveal(date);
    }

    /// Load `note_id` into the editor, replacing any unsaved edits.
    fn open_note(&mut self, user_id: &str, note_id: i64) {
        match self.store.note(user_id, note_id) {
            Some(note) => self.state.editor = Some(NoteEditor::from_note(note)),
            None => log::warn!("Note {} is not in the loaded note list", note_id),
        }
    }
}
