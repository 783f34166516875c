// Property-based tests for schedule geometry and gestures
// Exercises snapping, moves, resizes and overlap with random inputs

use proptest::prelude::*;
use timebox_notes::models::time_block::TimeRange;
use timebox_notes::schedule::geometry::{
    minute_to_offset, minutes_to_pixels, pixel_to_minutes, MIN_DURATION, PIXELS_PER_MINUTE,
    SNAP_MINUTES, WINDOW_END, WINDOW_START,
};
use timebox_notes::schedule::gesture::create::span_with_minimum;
use timebox_notes::schedule::gesture::drag::moved_range;
use timebox_notes::schedule::gesture::resize::resized_range;
use timebox_notes::schedule::gesture::ResizeEdge;
use timebox_notes::schedule::overlap::ranges_overlap;

/// Snapped minute inside the visible window.
fn snapped_minute() -> impl Strategy<Value = i32> {
    (0..=(WINDOW_END - WINDOW_START) / SNAP_MINUTES).prop_map(|step| WINDOW_START + step * SNAP_MINUTES)
}

/// Valid block: snapped start, duration a positive multiple of the snap step.
fn snapped_range() -> impl Strategy<Value = TimeRange> {
    snapped_minute()
        .prop_filter("room for a block", |start| *start < WINDOW_END)
        .prop_flat_map(|start| {
            let max_steps = (WINDOW_END - start) / SNAP_MINUTES;
            (Just(start), 1..=max_steps)
        })
        .prop_map(|(start, steps)| TimeRange {
            start,
            end: start + steps * SNAP_MINUTES,
        })
}

proptest! {
    /// Property: a snapped minute survives the trip to pixels and back
    #[test]
    fn prop_offset_round_trip_is_exact_on_snap_steps(minute in snapped_minute()) {
        prop_assert_eq!(pixel_to_minutes(minute_to_offset(minute)), minute);
    }

    /// Property: any pointer offset lands within half a snap step of its minute
    #[test]
    fn prop_pixel_to_minutes_snaps_and_clamps(y in -200.0f32..1500.0f32) {
        let minute = pixel_to_minutes(y);
        prop_assert!(minute >= WINDOW_START && minute <= WINDOW_END);
        prop_assert_eq!(minute % SNAP_MINUTES, 0);

        let raw = WINDOW_START as f32 + y / PIXELS_PER_MINUTE;
        if raw >= WINDOW_START as f32 && raw <= WINDOW_END as f32 {
            prop_assert!((minute as f32 - raw).abs() <= SNAP_MINUTES as f32 / 2.0 + 0.01);
        }
    }

    /// Property: rendered height is proportional to duration
    #[test]
    fn prop_pixel_span_matches_duration(range in snapped_range()) {
        let span = minutes_to_pixels(range);
        prop_assert!((span.height - range.duration() as f32 * PIXELS_PER_MINUTE).abs() < 0.01);
        prop_assert!((span.top - minute_to_offset(range.start)).abs() < 0.01);
    }

    /// Property: moving a block keeps its duration and keeps it inside the window
    #[test]
    fn prop_move_preserves_duration(range in snapped_range(), steps in -80i32..80) {
        let moved = moved_range(range, steps * SNAP_MINUTES);
        prop_assert_eq!(moved.duration(), range.duration());
        prop_assert!(moved.start >= WINDOW_START);
        prop_assert!(moved.end <= WINDOW_END);
        prop_assert_eq!(moved.start % SNAP_MINUTES, 0);
    }

    /// Property: resizing never goes below the minimum or outside the window
    #[test]
    fn prop_resize_respects_minimum_and_window(
        range in snapped_range(),
        top in any::<bool>(),
        steps in -80i32..80,
    ) {
        let edge = if top { ResizeEdge::Top } else { ResizeEdge::Bottom };
        let resized = resized_range(range, edge, steps * SNAP_MINUTES);

        prop_assert!(resized.duration() >= MIN_DURATION.min(range.duration()));
        prop_assert!(resized.start >= WINDOW_START);
        prop_assert!(resized.end <= WINDOW_END);
        match edge {
            ResizeEdge::Top => prop_assert_eq!(resized.end, range.end),
            ResizeEdge::Bottom => prop_assert_eq!(resized.start, range.start),
        }
    }

    /// Property: a drag-to-create span is ordered, padded and in the window
    #[test]
    fn prop_create_span_is_valid(a in snapped_minute(), b in snapped_minute()) {
        let span = span_with_minimum(a, b);
        prop_assert!(span.duration() >= MIN_DURATION);
        prop_assert!(span.start >= WINDOW_START);
        prop_assert!(span.end <= WINDOW_END);
        prop_assert!(span.validate().is_ok());
    }

    /// Property: a block always overlaps itself, never its neighbours
    #[test]
    fn prop_overlap_is_half_open(range in snapped_range()) {
        prop_assert!(ranges_overlap(range, range));

        if range.end + SNAP_MINUTES <= WINDOW_END {
            let after = TimeRange { start: range.end, end: range.end + SNAP_MINUTES };
            prop_assert!(!ranges_overlap(range, after));
            prop_assert!(!ranges_overlap(after, range));
        }
    }

    /// Property: overlap is symmetric
    #[test]
    fn prop_overlap_is_symmetric(a in snapped_range(), b in snapped_range()) {
        prop_assert_eq!(ranges_overlap(a, b), ranges_overlap(b, a));
    }
}
