//! Time block service.
//! Owner-scoped persistence for scheduled blocks, plus the day and range
//! queries the schedule and sidebar read from.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::time_block::{NewTimeBlock, ScheduledBlock, TimeBlock, TimeRange};
use crate::schedule::geometry::{minutes_to_time_string, time_string_to_minutes};
use crate::services::backend::{ensure_owner, BackendError};
use crate::services::note::map_note_columns;

pub struct TimeBlockService<'a> {
    conn: &'a Connection,
}

impl<'a> TimeBlockService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a block for a note the same user owns.
    pub fn create(&self, block: &NewTimeBlock) -> Result<TimeBlock> {
        validate_range(block.range)?;
        ensure_owner(self.conn, "notes", block.note_id, &block.user_id)?;

        self.conn
            .execute(
                "INSERT INTO time_blocks (user_id, note_id, date, start_time, end_time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    block.user_id,
                    block.note_id,
                    block.date,
                    minutes_to_time_string(block.range.start)?,
                    minutes_to_time_string(block.range.end)?,
                ],
            )
            .context("Failed to insert time block")?;

        let id = self.conn.last_insert_rowid();
        log::debug!(
            "Created time block {} for note {} on {} ({})",
            id,
            block.note_id,
            block.date,
            block.range.label()
        );

        Ok(TimeBlock {
            id,
            user_id: block.user_id.clone(),
            note_id: block.note_id,
            date: block.date,
            range: block.range,
        })
    }

    pub fn get(&self, user_id: &str, id: i64) -> Result<Option<TimeBlock>> {
        let block = self
            .conn
            .query_row(
                "SELECT id, user_id, note_id, date, start_time, end_time
                 FROM time_blocks WHERE id = ?1",
                [id],
                map_block_row,
            )
            .optional()
            .context("Failed to load time block")?;

        match block {
            Some(block) if block.user_id != user_id => {
                ensure_owner(self.conn, "time_blocks", id, user_id)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Replace start and end together.
    pub fn update_range(&self, user_id: &str, id: i64, range: TimeRange) -> Result<TimeBlock> {
        validate_range(range)?;
        ensure_owner(self.conn, "time_blocks", id, user_id)?;

        self.conn
            .execute(
                "UPDATE time_blocks SET start_time = ?1, end_time = ?2
                 WHERE id = ?3 AND user_id = ?4",
                params![
                    minutes_to_time_string(range.start)?,
                    minutes_to_time_string(range.end)?,
                    id,
                    user_id
                ],
            )
            .context("Failed to update time block")?;

        self.get(user_id, id)?
            .ok_or_else(|| anyhow!("Time block {} vanished during update", id))
    }

    pub fn delete(&self, user_id: &str, id: i64) -> Result<()> {
        ensure_owner(self.conn, "time_blocks", id, user_id)?;

        self.conn
            .execute(
                "DELETE FROM time_blocks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .context("Failed to delete time block")?;

        Ok(())
    }

    /// Blocks on one day joined with their notes, earliest first.
    pub fn list_for_day(&self, user_id: &str, date: NaiveDate) -> Result<Vec<ScheduledBlock>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.user_id, b.note_id, b.date, b.start_time, b.end_time,
                    n.id, n.user_id, n.title, n.content, n.created_at, n.updated_at
             FROM time_blocks b
             JOIN notes n ON n.id = b.note_id
             WHERE b.user_id = ?1 AND b.date = ?2
             ORDER BY b.start_time ASC, b.id ASC",
        )?;

        let blocks = stmt
            .query_map(params![user_id, date], |row| {
                Ok(ScheduledBlock {
                    block: map_block_row(row)?,
                    note: map_note_columns(row, 6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list time blocks for day")?;

        Ok(blocks)
    }

    /// `(date, note_id)` pairs for every block in `[start, end]`.
    pub fn dates_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, note_id FROM time_blocks
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;

        let rows = stmt
            .query_map(params![user_id, start, end], |row| {
                Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list time block dates")?;

        Ok(rows)
    }
}

fn validate_range(range: TimeRange) -> Result<()> {
    range
        .validate()
        .map_err(|reason| BackendError::Invalid(reason).into())
}

fn map_block_row(row: &Row<'_>) -> rusqlite::Result<TimeBlock> {
    let start = minutes_column(row, 4)?;
    let end = minutes_column(row, 5)?;
    let range = TimeRange::new(start, end)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into()))?;

    Ok(TimeBlock {
        id: row.get(0)?,
        user_id: row.get(1)?,
        note_id: row.get(2)?,
        date: row.get(3)?,
        range,
    })
}

fn minutes_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<i32> {
    let value: String = row.get(idx)?;
    time_string_to_minutes(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::NoteDraft;
    use crate::services::database::Database;
    use crate::services::note::NoteService;

    fn setup_test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn new_block(user: &str, note_id: i64, date: NaiveDate, start: i32, end: i32) -> NewTimeBlock {
        NewTimeBlock {
            user_id: user.to_string(),
            note_id,
            date,
            range: TimeRange::new(start, end).unwrap(),
        }
    }

    #[test]
    fn test_create_and_list_ordered_by_start() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::new("Deep work", "")).unwrap();

        blocks.create(&new_block("user-1", note.id, day(3), 720, 780)).unwrap();
        blocks.create(&new_block("user-1", note.id, day(3), 540, 600)).unwrap();
        blocks.create(&new_block("user-1", note.id, day(4), 600, 660)).unwrap();

        let listed = blocks.list_for_day("user-1", day(3)).unwrap();
        let starts: Vec<i32> = listed.iter().map(|b| b.range().start).collect();
        assert_eq!(starts, vec![540, 720]);
        assert_eq!(listed[0].note.title, "Deep work");
    }

    #[test]
    fn test_times_are_stored_as_wire_strings() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();
        let block = blocks.create(&new_block("user-1", note.id, day(3), 570, 615)).unwrap();

        let (date, start, end): (String, String, String) = db
            .connection()
            .query_row(
                "SELECT date, start_time, end_time FROM time_blocks WHERE id = ?1",
                [block.id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(date, "2025-03-03");
        assert_eq!(start, "09:30:00");
        assert_eq!(end, "10:15:00");
    }

    #[test]
    fn test_create_rejects_range_outside_window() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();

        let err = blocks
            .create(&new_block("user-1", note.id, day(3), 300, 400))
            .unwrap_err();
        assert!(matches!(BackendError::classify(err), BackendError::Invalid(_)));
    }

    #[test]
    fn test_create_for_foreign_note_is_denied() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("owner", &NoteDraft::untitled()).unwrap();

        let err = blocks
            .create(&new_block("intruder", note.id, day(3), 540, 600))
            .unwrap_err();
        assert!(matches!(BackendError::classify(err), BackendError::AccessDenied));
    }

    #[test]
    fn test_update_range_replaces_both_ends() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();
        let block = blocks.create(&new_block("user-1", note.id, day(3), 540, 600)).unwrap();

        let updated = blocks
            .update_range("user-1", block.id, TimeRange::new(360, 420).unwrap())
            .unwrap();
        assert_eq!(updated.range, TimeRange { start: 360, end: 420 });

        let err = blocks
            .update_range("someone-else", block.id, TimeRange::new(600, 660).unwrap())
            .unwrap_err();
        assert!(matches!(BackendError::classify(err), BackendError::AccessDenied));
    }

    #[test]
    fn test_deleting_note_cascades_to_blocks() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();
        blocks.create(&new_block("user-1", note.id, day(3), 540, 600)).unwrap();
        blocks.create(&new_block("user-1", note.id, day(5), 540, 600)).unwrap();

        notes.delete("user-1", note.id).unwrap();
        assert!(blocks.list_for_day("user-1", day(3)).unwrap().is_empty());
        assert!(blocks.dates_in_range("user-1", day(1), day(31)).unwrap().is_empty());
    }

    #[test]
    fn test_dates_in_range_is_inclusive() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();
        for d in [1, 3, 3, 10] {
            blocks.create(&new_block("user-1", note.id, day(d), 540, 600)).unwrap();
        }

        let rows = blocks.dates_in_range("user-1", day(3), day(10)).unwrap();
        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, vec![day(3), day(3), day(10)]);
    }

    #[test]
    fn test_delete_block() {
        let db = setup_test_db();
        let notes = NoteService::new(db.connection());
        let blocks = TimeBlockService::new(db.connection());
        let note = notes.create("user-1", &NoteDraft::untitled()).unwrap();
        let block = blocks.create(&new_block("user-1", note.id, day(3), 540, 600)).unwrap();

        blocks.delete("user-1", block.id).unwrap();
        assert!(blocks.get("user-1", block.id).unwrap().is_none());
        assert!(notes.get("user-1", note.id).unwrap().is_some(), "note survives");
    }
}
