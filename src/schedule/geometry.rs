//! Time grid geometry.
//!
//! Maps vertical pixel offsets inside the schedule canvas to minute-of-day
//! values and back. The canvas covers the scheduling window (06:00–22:00) at a
//! fixed 80 pixels per hour; offset `0.0` is the top of the 06:00 row.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveTime, Timelike};

use crate::models::time_block::TimeRange;

/// First schedulable minute of the day (06:00).
pub const WINDOW_START: i32 = 6 * 60;
/// Last schedulable minute of the day (22:00).
pub const WINDOW_END: i32 = 22 * 60;
pub const PIXELS_PER_HOUR: f32 = 80.0;
pub const PIXELS_PER_MINUTE: f32 = PIXELS_PER_HOUR / 60.0;
pub const MINUTES_PER_PIXEL: f32 = 60.0 / PIXELS_PER_HOUR;
/// Granularity every gesture snaps to.
pub const SNAP_MINUTES: i32 = 15;
/// Shortest block a resize or drag-to-create may produce.
pub const MIN_DURATION: i32 = 15;
/// Total canvas height for the window.
pub const GRID_HEIGHT: f32 = (WINDOW_END - WINDOW_START) as f32 * PIXELS_PER_MINUTE;

/// Vertical placement of a block inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSpan {
    pub top: f32,
    pub height: f32,
}

impl PixelSpan {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Round a minute quantity to the nearest snap step. Halves round up, so
/// `-7.5` becomes `0` rather than `-15`.
pub fn snap_minutes(minutes: f32) -> i32 {
    ((minutes / SNAP_MINUTES as f32) + 0.5).floor() as i32 * SNAP_MINUTES
}

pub fn clamp_to_window(minutes: i32) -> i32 {
    minutes.clamp(WINDOW_START, WINDOW_END)
}

/// Pointer offset → snapped, clamped minute-of-day.
pub fn pixel_to_minutes(y: f32) -> i32 {
    clamp_to_window(snap_minutes(WINDOW_START as f32 + y * MINUTES_PER_PIXEL))
}

/// Pointer travel → signed minute delta in snap steps. Not clamped.
pub fn pixel_delta_to_minutes(delta_y: f32) -> i32 {
    snap_minutes(delta_y * MINUTES_PER_PIXEL)
}

pub fn minute_to_offset(minutes: i32) -> f32 {
    (minutes - WINDOW_START) as f32 * PIXELS_PER_MINUTE
}

/// Stored range → canvas placement. The caller guarantees a valid range.
pub fn minutes_to_pixels(range: TimeRange) -> PixelSpan {
    PixelSpan {
        top: minute_to_offset(range.start),
        height: range.duration() as f32 * PIXELS_PER_MINUTE,
    }
}

/// 12-hour clock label, e.g. `570` → `"9:30 AM"`.
pub fn format_time_of_day(minutes: i32) -> String {
    let minutes = minutes.rem_euclid(24 * 60);
    let hour = minutes / 60;
    let minute = minutes % 60;
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, minute, suffix)
}

/// Row label for the hour gutter, e.g. `13` → `"1 PM"`.
pub fn hour_label(hour: i32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h < 12 => format!("{} AM", h),
        h => format!("{} PM", h - 12),
    }
}

/// Parse a stored `HH:MM:SS` (or `HH:MM`) time into minute-of-day.
pub fn time_string_to_minutes(value: &str) -> Result<i32> {
    let value = value.trim();
    let time = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("Invalid time '{}', expected HH:MM:SS", value))?;
    Ok((time.hour() * 60 + time.minute()) as i32)
}

/// Minute-of-day → stored `HH:MM:SS`; seconds are always zero.
pub fn minutes_to_time_string(minutes: i32) -> Result<String> {
    if !(0..24 * 60).contains(&minutes) {
        return Err(anyhow!("Minute of day {} is outside 00:00-23:59", minutes));
    }
    Ok(format!("{:02}:{:02}:00", minutes / 60, minutes % 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn offset_for(hour: i32, minute: i32) -> f32 {
        minute_to_offset(hour * 60 + minute)
    }

    #[test]
    fn test_window_constants() {
        assert_eq!(WINDOW_START, 360);
        assert_eq!(WINDOW_END, 1320);
        assert_eq!(GRID_HEIGHT, 1280.0);
    }

    #[test_case(10, 5, 600 ; "10:05 snaps down to 10:00")]
    #[test_case(10, 20, 615 ; "10:20 snaps down to 10:15")]
    #[test_case(10, 8, 615 ; "10:08 snaps up to 10:15")]
    #[test_case(6, 0, 360 ; "window start")]
    #[test_case(22, 0, 1320 ; "window end")]
    fn test_pixel_to_minutes_snaps(hour: i32, minute: i32, expected: i32) {
        assert_eq!(pixel_to_minutes(offset_for(hour, minute)), expected);
    }

    #[test]
    fn test_pixel_to_minutes_clamps_instead_of_wrapping() {
        assert_eq!(pixel_to_minutes(-500.0), WINDOW_START);
        assert_eq!(pixel_to_minutes(GRID_HEIGHT + 500.0), WINDOW_END);
    }

    #[test]
    fn test_snap_rounds_halves_up() {
        assert_eq!(snap_minutes(7.5), 15);
        assert_eq!(snap_minutes(-7.5), 0);
        assert_eq!(snap_minutes(-8.0), -15);
    }

    #[test]
    fn test_pixel_delta_to_minutes() {
        // 5 hours up
        assert_eq!(pixel_delta_to_minutes(-400.0), -300);
        assert_eq!(pixel_delta_to_minutes(120.0), 90);
        assert_eq!(pixel_delta_to_minutes(4.0), 0);
    }

    #[test]
    fn test_minutes_to_pixels() {
        let span = minutes_to_pixels(TimeRange::new(540, 600).unwrap());
        assert_eq!(span.top, 240.0);
        assert_eq!(span.height, 80.0);
        assert_eq!(span.bottom(), 320.0);
    }

    #[test_case(570, "9:30 AM")]
    #[test_case(0, "12:00 AM")]
    #[test_case(720, "12:00 PM")]
    #[test_case(1319, "9:59 PM")]
    #[test_case(1320, "10:00 PM")]
    fn test_format_time_of_day(minutes: i32, expected: &str) {
        assert_eq!(format_time_of_day(minutes), expected);
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(6), "6 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(22), "10 PM");
    }

    #[test]
    fn test_time_string_round_trip() {
        assert_eq!(time_string_to_minutes("09:30:00").unwrap(), 570);
        assert_eq!(time_string_to_minutes("22:00").unwrap(), 1320);
        assert_eq!(minutes_to_time_string(570).unwrap(), "09:30:00");
        assert_eq!(minutes_to_time_string(0).unwrap(), "00:00:00");
    }

    #[test]
    fn test_time_string_rejects_garbage() {
        assert!(time_string_to_minutes("25:00:00").is_err());
        assert!(time_string_to_minutes("nine").is_err());
        assert!(minutes_to_time_string(24 * 60).is_err());
        assert!(minutes_to_time_string(-15).is_err());
    }
}
