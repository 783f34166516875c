use chrono::NaiveDate;

use crate::models::note::{Note, NoteDraft};
use crate::schedule::date_tree::ExpandedNodes;
use crate::services::auth::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMessage {
    Info(String),
    Error(String),
}

/// Sign-in / sign-up form contents.
#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub errors: FieldErrors,
    pub message: Option<AuthMessage>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::SignIn,
            email: String::new(),
            password: String::new(),
            errors: FieldErrors::default(),
            message: None,
        }
    }
}

impl AuthForm {
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.errors = FieldErrors::default();
        self.message = None;
    }
}

/// Unsaved edits to the open note.
#[derive(Debug, Clone)]
pub struct NoteEditor {
    pub note_id: i64,
    pub title: String,
    pub content: String,
    pub dirty: bool,
}

impl NoteEditor {
    pub fn from_note(note: &Note) -> Self {
        Self {
            note_id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            dirty: false,
        }
    }

    pub fn draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.clone(), self.content.clone())
    }
}

/// UI state owned by the window, none of it persisted.
pub struct AppState {
    pub auth_form: AuthForm,
    pub expanded: ExpandedNodes,
    pub selected_block: Option<i64>,
    pub editor: Option<NoteEditor>,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            auth_form: AuthForm::default(),
            expanded: ExpandedNodes::for_today(today),
            selected_block: None,
            editor: None,
        }
    }
}
