// Time block module
// A scheduled occurrence of a note on one calendar day

use chrono::NaiveDate;

use crate::models::note::Note;
use crate::schedule::geometry::{format_time_of_day, WINDOW_END, WINDOW_START};

/// Half-open `[start, end)` range of minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: i32,
    pub end: i32,
}

impl TimeRange {
    /// Create a range, rejecting empty or inverted ones.
    pub fn new(start: i32, end: i32) -> Result<Self, String> {
        if end <= start {
            return Err(format!(
                "Time block end ({}) must be after start ({})",
                end, start
            ));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }

    pub fn is_within_window(&self) -> bool {
        self.start >= WINDOW_START && self.end <= WINDOW_END
    }

    /// Validate the stored-block invariant: non-empty and inside the window.
    pub fn validate(&self) -> Result<(), String> {
        if self.end <= self.start {
            return Err("Time block end must be after start".to_string());
        }
        if !self.is_within_window() {
            return Err(format!(
                "Time block {} must lie within {}-{}",
                self.label(),
                format_time_of_day(WINDOW_START),
                format_time_of_day(WINDOW_END)
            ));
        }
        Ok(())
    }

    /// e.g. "9:00 AM – 10:00 AM"
    pub fn label(&self) -> String {
        format!(
            "{} – {}",
            format_time_of_day(self.start),
            format_time_of_day(self.end)
        )
    }
}

/// Default slot for a freshly created note (09:00–10:00).
pub const DEFAULT_BLOCK: TimeRange = TimeRange {
    start: 9 * 60,
    end: 10 * 60,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    pub id: i64,
    pub user_id: String,
    pub note_id: i64,
    pub date: NaiveDate,
    pub range: TimeRange,
}

/// Fields required to insert a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeBlock {
    pub user_id: String,
    pub note_id: i64,
    pub date: NaiveDate,
    pub range: TimeRange,
}

/// A block joined with the note it schedules, as the day view reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledBlock {
    pub block: TimeBlock,
    pub note: Note,
}

impl ScheduledBlock {
    pub fn id(&self) -> i64 {
        self.block.id
    }

    pub fn range(&self) -> TimeRange {
        self.block.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_inverted() {
        assert!(TimeRange::new(600, 600).is_err());
        assert!(TimeRange::new(600, 540).is_err());
        assert_eq!(TimeRange::new(540, 600).unwrap().duration(), 60);
    }

    #[test]
    fn test_validate_window() {
        assert!(TimeRange::new(360, 1320).unwrap().validate().is_ok());
        assert!(TimeRange::new(345, 400).unwrap().validate().is_err());
        assert!(TimeRange::new(1300, 1335).unwrap().validate().is_err());
    }

    #[test]
    fn test_default_block_is_nine_to_ten() {
        assert_eq!(DEFAULT_BLOCK.label(), "9:00 AM – 10:00 AM");
        assert!(DEFAULT_BLOCK.validate().is_ok());
    }
}
