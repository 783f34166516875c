//! Selected-day state for the dashboard.

use chrono::{Days, Local, NaiveDate};

use crate::schedule::store::ScheduleKey;
use crate::utils::date::format_long_date;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNavigation {
    today: NaiveDate,
    selected: NaiveDate,
}

impl DayNavigation {
    /// Start on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            selected: today,
        }
    }

    pub fn from_local_clock() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn is_today_selected(&self) -> bool {
        self.selected == self.today
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    pub fn go_today(&mut self) {
        self.selected = self.today;
    }

    pub fn go_tomorrow(&mut self) {
        self.selected = offset(self.today, 1);
    }

    pub fn go_next_week(&mut self) {
        self.selected = offset(self.today, 7);
    }

    pub fn previous_day(&mut self) {
        self.selected = self.selected.pred_opt().unwrap_or(self.selected);
    }

    pub fn next_day(&mut self) {
        self.selected = offset(self.selected, 1);
    }

    /// Keep "today" current across midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn schedule_key(&self, user_id: &str) -> ScheduleKey {
        ScheduleKey::new(user_id, self.selected)
    }

    /// e.g. "Monday, March 3, 2025"
    pub fn header_label(&self) -> String {
        format_long_date(self.selected)
    }
}

fn offset(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_shortcuts_are_relative_to_today() {
        let mut nav = DayNavigation::new(monday());
        nav.select(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        nav.go_tomorrow();
        assert_eq!(nav.selected(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        nav.go_next_week();
        assert_eq!(nav.selected(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        nav.go_today();
        assert!(nav.is_today_selected());
    }

    #[test]
    fn test_stepping_crosses_month_boundaries() {
        let mut nav = DayNavigation::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        nav.previous_day();
        assert_eq!(nav.selected(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        nav.next_day();
        nav.next_day();
        assert_eq!(nav.selected(), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn test_key_and_header_follow_selection() {
        let nav = DayNavigation::new(monday());
        assert_eq!(nav.schedule_key("user-1"), ScheduleKey::new("user-1", monday()));
        assert_eq!(nav.header_label(), "Monday, March 3, 2025");
    }
}
