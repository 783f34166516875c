//! Storage boundary for notes, time blocks, and subscriptions.
//!
//! Every call is keyed by the owner id. Implementations enforce ownership:
//! touching a row that belongs to another user fails with
//! [`BackendError::AccessDenied`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::note::{Note, NoteDraft};
use crate::models::subscription::Subscription;
use crate::models::time_block::{NewTimeBlock, ScheduledBlock, TimeBlock, TimeRange};

mod ownership;
mod sqlite;

pub(crate) use ownership::ensure_owner;
pub use sqlite::SqliteBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("access denied")]
    AccessDenied,
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(anyhow::Error),
}

impl BackendError {
    /// Recover a typed error raised inside an `anyhow` chain.
    pub fn classify(err: anyhow::Error) -> Self {
        match err.downcast::<BackendError>() {
            Ok(typed) => typed,
            Err(other) => match other.downcast_ref::<rusqlite::Error>() {
                Some(rusqlite::Error::SqliteFailure(code, message))
                    if code.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    BackendError::Invalid(
                        message
                            .clone()
                            .unwrap_or_else(|| "constraint violation".to_string()),
                    )
                }
                _ => BackendError::Storage(other),
            },
        }
    }

    /// Failures the user can do nothing about other than retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Storage(_))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Persistence operations the schedule and note screens consume.
#[cfg_attr(test, mockall::automock)]
pub trait ScheduleBackend {
    /// Blocks on `date` joined with their notes, ordered by start time.
    fn list_blocks(&self, user_id: &str, date: NaiveDate) -> BackendResult<Vec<ScheduledBlock>>;

    /// `(date, note_id)` for every block between `start` and `end` inclusive.
    fn list_block_dates_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BackendResult<Vec<(NaiveDate, i64)>>;

    fn create_block(&self, block: &NewTimeBlock) -> BackendResult<TimeBlock>;

    /// Replace both start and end of a block.
    fn update_block(&self, user_id: &str, block_id: i64, range: TimeRange)
        -> BackendResult<TimeBlock>;

    fn delete_block(&self, user_id: &str, block_id: i64) -> BackendResult<()>;

    fn create_note(&self, user_id: &str, draft: &NoteDraft) -> BackendResult<Note>;

    /// Create a note and its first block as one write; either both exist
    /// afterwards or neither does.
    fn create_scheduled_note(
        &self,
        user_id: &str,
        draft: &NoteDraft,
        date: NaiveDate,
        range: TimeRange,
    ) -> BackendResult<ScheduledBlock>;

    fn get_note(&self, user_id: &str, note_id: i64) -> BackendResult<Option<Note>>;

    /// Most recently edited first.
    fn list_notes(&self, user_id: &str) -> BackendResult<Vec<Note>>;

    fn update_note(&self, user_id: &str, note_id: i64, draft: &NoteDraft) -> BackendResult<Note>;

    /// Deleting a note removes every block that schedules it.
    fn delete_note(&self, user_id: &str, note_id: i64) -> BackendResult<()>;

    fn get_subscription(&self, user_id: &str) -> BackendResult<Option<Subscription>>;
}
