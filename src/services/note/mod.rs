//! Note service.
//! Owner-scoped CRUD for notes stored in SQLite.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::note::{Note, NoteDraft};
use crate::services::backend::ensure_owner;

/// Service for managing notes stored in SQLite.
pub struct NoteService<'a> {
    conn: &'a Connection,
}

impl<'a> NoteService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a note owned by `user_id`.
    pub fn create(&self, user_id: &str, draft: &NoteDraft) -> Result<Note> {
        let now = Local::now();
        let stamp = now.to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO notes (user_id, title, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![user_id, draft.title, draft.content, stamp],
            )
            .context("Failed to insert note")?;

        let id = self.conn.last_insert_rowid();
        log::debug!("Created note {} for user {}", id, user_id);

        Ok(Note {
            id,
            user_id: user_id.to_string(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a note; `None` if it does not exist.
    pub fn get(&self, user_id: &str, id: i64) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, user_id, title, content, created_at, updated_at
                 FROM notes WHERE id = ?1",
                [id],
                map_note_row,
            )
            .optional()
            .context("Failed to load note")?;

        match note {
            Some(note) if note.user_id != user_id => {
                ensure_owner(self.conn, "notes", id, user_id)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, content, created_at, updated_at
             FROM notes
             WHERE user_id = ?1
             ORDER BY updated_at DESC, id DESC",
        )?;

        let notes = stmt
            .query_map([user_id], map_note_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list notes")?;

        Ok(notes)
    }

    /// Replace title and content, bumping `updated_at`.
    pub fn update(&self, user_id: &str, id: i64, draft: &NoteDraft) -> Result<Note> {
        ensure_owner(self.conn, "notes", id, user_id)?;

        self.conn
            .execute(
                "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3
                 WHERE id = ?4 AND user_id = ?5",
                params![
                    draft.title,
                    draft.content,
                    Local::now().to_rfc3339(),
                    id,
                    user_id
                ],
            )
            .context("Failed to update note")?;

        self.get(user_id, id)?
            .ok_or_else(|| anyhow!("Note {} vanished during update", id))
    }

    /// Delete a note; its time blocks go with it.
    pub fn delete(&self, user_id: &str, id: i64) -> Result<()> {
        ensure_owner(self.conn, "notes", id, user_id)?;

        self.conn
            .execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .context("Failed to delete note")?;

        log::debug!("Deleted note {} for user {}", id, user_id);
        Ok(())
    }
}

pub(crate) fn map_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    map_note_columns(row, 0)
}

/// Read a note whose six columns start at `offset`, for joined rows.
pub(crate) fn map_note_columns(row: &Row<'_>, offset: usize) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        title: row.get(offset + 2)?,
        content: row.get(offset + 3)?,
        created_at: to_local_datetime(row.get::<_, String>(offset + 4)?)?,
        updated_at: to_local_datetime(row.get::<_, String>(offset + 5)?)?,
    })
}

fn to_local_datetime(value: String) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::BackendError;
    use crate::services::database::Database;

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    #[test]
    fn test_create_and_get_note() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());

        let created = service
            .create("user-1", &NoteDraft::new("Plan", "outline"))
            .unwrap();
        let found = service.get("user-1", created.id).unwrap().unwrap();

        assert_eq!(found.title, "Plan");
        assert_eq!(found.content, "outline");
        assert_eq!(found.user_id, "user-1");
    }

    #[test]
    fn test_get_nonexistent_note() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        assert!(service.get("user-1", 999).unwrap().is_none());
    }

    #[test]
    fn test_get_other_users_note_is_denied() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        let note = service.create("owner", &NoteDraft::untitled()).unwrap();

        let err = service.get("intruder", note.id).unwrap_err();
        assert!(matches!(
            BackendError::classify(err),
            BackendError::AccessDenied
        ));
    }

    #[test]
    fn test_list_is_scoped_to_user() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        service.create("user-1", &NoteDraft::new("a", "")).unwrap();
        service.create("user-1", &NoteDraft::new("b", "")).unwrap();
        service.create("user-2", &NoteDraft::new("c", "")).unwrap();

        let titles: Vec<String> = service
            .list("user-1")
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles.contains(&"c".to_string()));
    }

    #[test]
    fn test_update_note() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        let note = service.create("user-1", &NoteDraft::untitled()).unwrap();

        let updated = service
            .update("user-1", note.id, &NoteDraft::new("Renamed", "body"))
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "body");
        assert!(updated.updated_at >= note.updated_at);
    }

    #[test]
    fn test_update_nonexistent_note() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        let err = service
            .update("user-1", 42, &NoteDraft::untitled())
            .unwrap_err();
        assert!(matches!(
            BackendError::classify(err),
            BackendError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete_note() {
        let db = setup_test_db();
        let service = NoteService::new(db.connection());
        let note = service.create("user-1", &NoteDraft::untitled()).unwrap();

        service.delete("user-1", note.id).unwrap();
        assert!(service.get("user-1", note.id).unwrap().is_none());
        assert!(service.delete("user-1", note.id).is_err());
    }
}
