// Note module
// Free-form note content that time blocks schedule

use chrono::{DateTime, Local};

/// Title given to notes created from the schedule.
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Note {
    /// Title for display; blank titles render as "Untitled Note".
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            "Untitled Note"
        } else {
            trimmed
        }
    }
}

/// Fields supplied when creating or editing a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            content: content.into(),
        }
    }

    /// Blank note as created by drag-to-create and "New Note".
    pub fn untitled() -> Self {
        Self::new(DEFAULT_NOTE_TITLE, "")
    }
}
