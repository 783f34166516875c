use anyhow::Context;
use chrono::NaiveDate;

use crate::models::note::{Note, NoteDraft};
use crate::models::subscription::Subscription;
use crate::models::time_block::{NewTimeBlock, ScheduledBlock, TimeBlock, TimeRange};
use crate::services::database::Database;
use crate::services::note::NoteService;
use crate::services::subscription::SubscriptionService;
use crate::services::time_block::TimeBlockService;

use super::{BackendError, BackendResult, ScheduleBackend};

/// [`ScheduleBackend`] over the local SQLite database.
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and make sure the schema exists.
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let db = Database::new(path)?;
        db.initialize_schema()?;
        log::info!("Opened schedule database at {}", db.path());
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn notes(&self) -> NoteService<'_> {
        NoteService::new(self.db.connection())
    }

    fn blocks(&self) -> TimeBlockService<'_> {
        TimeBlockService::new(self.db.connection())
    }

    /// Note and first block in one transaction.
    fn create_scheduled_note_tx(
        &self,
        user_id: &str,
        draft: &NoteDraft,
        date: NaiveDate,
        range: TimeRange,
    ) -> anyhow::Result<ScheduledBlock> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let note = NoteService::new(&tx).create(user_id, draft)?;
        let block = TimeBlockService::new(&tx).create(&NewTimeBlock {
            user_id: user_id.to_string(),
            note_id: note.id,
            date,
            range,
        })?;

        tx.commit().context("Failed to commit scheduled note")?;
        Ok(ScheduledBlock { block, note })
    }
}

fn classified<T>(result: anyhow::Result<T>) -> BackendResult<T> {
    result.map_err(BackendError::classify)
}

impl ScheduleBackend for SqliteBackend {
    fn list_blocks(&self, user_id: &str, date: NaiveDate) -> BackendResult<Vec<ScheduledBlock>> {
        classified(self.blocks().list_for_day(user_id, date))
    }

    fn list_block_dates_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BackendResult<Vec<(NaiveDate, i64)>> {
        classified(self.blocks().dates_in_range(user_id, start, end))
    }

    fn create_block(&self, block: &NewTimeBlock) -> BackendResult<TimeBlock> {
        classified(self.blocks().create(block))
    }

    fn update_block(
        &self,
        user_id: &str,
        block_id: i64,
        range: TimeRange,
    ) -> BackendResult<TimeBlock> {
        classified(self.blocks().update_range(user_id, block_id, range))
    }

    fn delete_block(&self, user_id: &str, block_id: i64) -> BackendResult<()> {
        classified(self.blocks().delete(user_id, block_id))
    }

    fn create_note(&self, user_id: &str, draft: &NoteDraft) -> BackendResult<Note> {
        classified(self.notes().create(user_id, draft))
    }

    fn create_scheduled_note(
        &self,
        user_id: &str,
        draft: &NoteDraft,
        date: NaiveDate,
        range: TimeRange,
    ) -> BackendResult<ScheduledBlock> {
        classified(self.create_scheduled_note_tx(user_id, draft, date, range))
    }

    fn get_note(&self, user_id: &str, note_id: i64) -> BackendResult<Option<Note>> {
        classified(self.notes().get(user_id, note_id))
    }

    fn list_notes(&self, user_id: &str) -> BackendResult<Vec<Note>> {
        classified(self.notes().list(user_id))
    }

    fn update_note(&self, user_id: &str, note_id: i64, draft: &NoteDraft) -> BackendResult<Note> {
        classified(self.notes().update(user_id, note_id, draft))
    }

    fn delete_note(&self, user_id: &str, note_id: i64) -> BackendResult<()> {
        classified(self.notes().delete(user_id, note_id))
    }

    fn get_subscription(&self, user_id: &str) -> BackendResult<Option<Subscription>> {
        classified(SubscriptionService::new(self.db.connection()).get(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SqliteBackend {
        SqliteBackend::open(":memory:").unwrap()
    }

    fn march(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_create_scheduled_note_writes_both_rows() {
        let backend = backend();
        let scheduled = backend
            .create_scheduled_note(
                "user-1",
                &NoteDraft::untitled(),
                march(3),
                TimeRange::new(600, 615).unwrap(),
            )
            .unwrap();

        assert_eq!(scheduled.block.note_id, scheduled.note.id);
        let listed = backend.list_blocks("user-1", march(3)).unwrap();
        assert_eq!(listed, vec![scheduled]);
    }

    #[test]
    fn test_failed_scheduled_note_leaves_no_orphan_note() {
        let backend = backend();
        let err = backend
            .create_scheduled_note(
                "user-1",
                &NoteDraft::untitled(),
                march(3),
                TimeRange { start: 60, end: 120 },
            )
            .unwrap_err();

        assert!(matches!(err, BackendError::Invalid(_)));
        assert!(backend.list_notes("user-1").unwrap().is_empty());
    }

    #[test]
    fn test_foreign_block_update_is_access_denied() {
        let backend = backend();
        let scheduled = backend
            .create_scheduled_note(
                "owner",
                &NoteDraft::untitled(),
                march(3),
                TimeRange::new(540, 600).unwrap(),
            )
            .unwrap();

        let err = backend
            .update_block("intruder", scheduled.id(), TimeRange::new(600, 660).unwrap())
            .unwrap_err();
        assert!(matches!(err, BackendError::AccessDenied));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_missing_block_is_not_found() {
        let backend = backend();
        let err = backend.delete_block("user-1", 42).unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
