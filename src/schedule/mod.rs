//! Scheduling core: grid geometry, overlap rules, pointer gestures, and the
//! cached read model the day view draws from. Nothing in here depends on the
//! UI toolkit.

pub mod date_tree;
pub mod geometry;
pub mod gesture;
pub mod navigation;
pub mod overlap;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use gesture::{GestureCommit, GestureController, GesturePreview};
pub use navigation::DayNavigation;
pub use store::{ScheduleKey, ScheduleStore};
