//! Read-through cache over a [`ScheduleBackend`].
//!
//! Reads are keyed by `(user, date)` (or user alone for notes and the
//! subscription). Any mutation marks every entry belonging to that user as
//! stale; the next read refetches. A refetch that fails keeps the last value
//! that loaded successfully.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::models::note::{Note, NoteDraft};
use crate::models::subscription::Subscription;
use crate::models::time_block::{NewTimeBlock, ScheduledBlock, DEFAULT_BLOCK};
use crate::schedule::gesture::GestureCommit;
use crate::services::backend::{BackendResult, ScheduleBackend};

/// Identity of one day's schedule read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleKey {
    pub user_id: String,
    pub date: NaiveDate,
}

impl ScheduleKey {
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RangeKey {
    user_id: String,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug)]
struct Cached<T> {
    value: T,
    stale: bool,
}

pub struct ScheduleStore<B: ScheduleBackend> {
    backend: B,
    days: HashMap<ScheduleKey, Cached<Vec<ScheduledBlock>>>,
    ranges: HashMap<RangeKey, Cached<Vec<(NaiveDate, i64)>>>,
    notes: HashMap<String, Cached<Vec<Note>>>,
    subscriptions: HashMap<String, Cached<Option<Subscription>>>,
}

impl<B: ScheduleBackend> ScheduleStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            days: HashMap::new(),
            ranges: HashMap::new(),
            notes: HashMap::new(),
            subscriptions: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Blocks for one day, ordered by start time.
    pub fn blocks(&mut self, key: &ScheduleKey) -> &[ScheduledBlock] {
        let backend = &self.backend;
        let blocks = read_through(&mut self.days, key.clone(), format!("blocks for {}", key.date), || {
            backend.list_blocks(&key.user_id, key.date)
        });
        blocks.as_slice()
    }

    /// `(date, note_id)` rows for every block in `[start, end]`.
    pub fn block_dates(
        &mut self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> &[(NaiveDate, i64)] {
        let backend = &self.backend;
        let key = RangeKey {
            user_id: user_id.to_string(),
            start,
            end,
        };
        let rows = read_through(&mut self.ranges, key, format!("block dates {}..{}", start, end), || {
            backend.list_block_dates_in_range(user_id, start, end)
        });
        rows.as_slice()
    }

    /// The user's notes, most recently edited first.
    pub fn notes(&mut self, user_id: &str) -> &[Note] {
        let backend = &self.backend;
        let notes = read_through(&mut self.notes, user_id.to_string(), "notes", || {
            backend.list_notes(user_id)
        });
        notes.as_slice()
    }

    pub fn note(&mut self, user_id: &str, note_id: i64) -> Option<&Note> {
        self.notes(user_id).iter().find(|note| note.id == note_id)
    }

    pub fn subscription(&mut self, user_id: &str) -> Option<&Subscription> {
        let backend = &self.backend;
        read_through(&mut self.subscriptions, user_id.to_string(), "subscription", || {
            backend.get_subscription(user_id)
        })
        .as_ref()
    }

    /// Persist the result of a finished gesture on `date`.
    ///
    /// Returns the id of the note the commit touched. Failures are logged
    /// and returned, never retried; the user's reads are invalidated either
    /// way so the view settles on what storage actually holds.
    pub fn commit(
        &mut self,
        user_id: &str,
        date: NaiveDate,
        commit: GestureCommit,
    ) -> BackendResult<i64> {
        let result = match commit {
            GestureCommit::UpdateBlock { block_id, range } => self
                .backend
                .update_block(user_id, block_id, range)
                .map(|block| block.note_id),
            GestureCommit::CreateNote { range } => self
                .backend
                .create_scheduled_note(user_id, &NoteDraft::untitled(), date, range)
                .map(|scheduled| scheduled.note.id),
            GestureCommit::ScheduleNote { note_id, range } => self
                .backend
                .create_block(&NewTimeBlock {
                    user_id: user_id.to_string(),
                    note_id,
                    date,
                    range,
                })
                .map(|block| block.note_id),
        };

        match &result {
            Ok(note_id) => log::info!("Committed {:?} on {} (note {})", commit, date, note_id),
            Err(err) => log::error!("Failed to commit {:?} on {}: {}", commit, date, err),
        }
        self.invalidate_user(user_id);
        result
    }

    /// "New Note" action: a blank note scheduled 09:00-10:00 on `date`.
    pub fn create_note_with_default_block(
        &mut self,
        user_id: &str,
        date: NaiveDate,
    ) -> BackendResult<ScheduledBlock> {
        let result =
            self.backend
                .create_scheduled_note(user_id, &NoteDraft::untitled(), date, DEFAULT_BLOCK);
        if let Err(err) = &result {
            log::error!("Failed to create note on {}: {}", date, err);
        }
        self.invalidate_user(user_id);
        result
    }

    pub fn update_note(
        &mut self,
        user_id: &str,
        note_id: i64,
        draft: &NoteDraft,
    ) -> BackendResult<Note> {
        let result = self.backend.update_note(user_id, note_id, draft);
        if let Err(err) = &result {
            log::error!("Failed to update note {}: {}", note_id, err);
        }
        self.invalidate_user(user_id);
        result
    }

    pub fn delete_block(&mut self, user_id: &str, block_id: i64) -> BackendResult<()> {
        let result = self.backend.delete_block(user_id, block_id);
        if let Err(err) = &result {
            log::error!("Failed to delete time block {}: {}", block_id, err);
        }
        self.invalidate_user(user_id);
        result
    }

    /// Delete a note together with all of its blocks.
    pub fn delete_note(&mut self, user_id: &str, note_id: i64) -> BackendResult<()> {
        let result = self.backend.delete_note(user_id, note_id);
        if let Err(err) = &result {
            log::error!("Failed to delete note {}: {}", note_id, err);
        }
        self.invalidate_user(user_id);
        result
    }

    /// Mark every cached read for `user_id` stale.
    pub fn invalidate_user(&mut self, user_id: &str) {
        self.days
            .iter_mut()
            .filter(|(key, _)| key.user_id == user_id)
            .for_each(|(_, cached)| cached.stale = true);
        self.ranges
            .iter_mut()
            .filter(|(key, _)| key.user_id == user_id)
            .for_each(|(_, cached)| cached.stale = true);
        if let Some(cached) = self.notes.get_mut(user_id) {
            cached.stale = true;
        }
        if let Some(cached) = self.subscriptions.get_mut(user_id) {
            cached.stale = true;
        }
    }

    /// Drop everything, e.g. on sign-out.
    pub fn clear(&mut self) {
        self.days.clear();
        self.ranges.clear();
        self.notes.clear();
        self.subscriptions.clear();
    }
}

/// Return the cached value for `key`, fetching it first when missing or
/// stale. A failed fetch keeps the previous value (or the default) and is
/// not retried until the next invalidation.
fn read_through<'c, K, T, F>(
    cache: &'c mut HashMap<K, Cached<T>>,
    key: K,
    what: impl Display,
    fetch: F,
) -> &'c T
where
    K: Eq + Hash,
    T: Default,
    F: FnOnce() -> BackendResult<T>,
{
    let needs_fetch = cache.get(&key).map_or(true, |cached| cached.stale);
    let entry = cache.entry(key).or_insert_with(|| Cached {
        value: T::default(),
        stale: true,
    });

    if needs_fetch {
        match fetch() {
            Ok(value) => entry.value = value,
            Err(err) => log::error!("Failed to load {}: {}", what, err),
        }
        entry.stale = false;
    }

    &entry.value
}
