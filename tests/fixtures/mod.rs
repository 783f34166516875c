// Test fixtures - reusable test data
// Provides a file-backed database and common schedule values

#![allow(dead_code)]

use chrono::NaiveDate;
use tempfile::TempDir;
use timebox_notes::models::time_block::TimeRange;
use timebox_notes::services::backend::SqliteBackend;

pub const USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

/// Monday, March 3, 2025
pub fn schedule_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

pub fn range(start: i32, end: i32) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

/// Backend over a fresh database file. Keep the directory alive for the
/// duration of the test.
pub fn file_backend() -> (TempDir, SqliteBackend) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("timebox.db");
    let backend =
        SqliteBackend::open(path.to_str().unwrap()).expect("Failed to open database");
    (dir, backend)
}
