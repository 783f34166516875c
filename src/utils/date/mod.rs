// Date utility functions
// Calendar days are naive local dates; no timezone conversion is applied.

use chrono::NaiveDate;

/// Heading label, e.g. "Monday, March 3, 2025".
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
