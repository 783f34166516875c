//! Fixtures shared by the scheduling unit tests.

use chrono::{Local, NaiveDate};

use crate::models::note::Note;
use crate::models::time_block::{ScheduledBlock, TimeBlock, TimeRange};

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

pub fn note(id: i64) -> Note {
    let now = Local::now();
    Note {
        id,
        user_id: "user-1".into(),
        title: format!("Note {}", id),
        content: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Block `id` scheduling note `id` on [`test_date`].
pub fn scheduled(id: i64, start: i32, end: i32) -> ScheduledBlock {
    ScheduledBlock {
        block: TimeBlock {
            id,
            user_id: "user-1".into(),
            note_id: id,
            date: test_date(),
            range: TimeRange::new(start, end).unwrap(),
        },
        note: note(id),
    }
}
