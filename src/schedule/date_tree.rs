//! Sidebar tree of upcoming days grouped by year and month.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Months, NaiveDate};

/// How far ahead of today the tree reaches.
pub const TREE_MONTHS_AHEAD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearNode {
    /// "2025"
    pub key: String,
    pub months: Vec<MonthNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNode {
    /// "2025-03"
    pub key: String,
    /// "March"
    pub label: String,
    pub days: Vec<DayNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayNode {
    pub date: NaiveDate,
    /// "3 Mon"
    pub label: String,
    /// Time blocks scheduled on this day.
    pub count: usize,
}

/// Inclusive `(start, end)` span covered by the tree.
pub fn tree_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_add_months(Months::new(TREE_MONTHS_AHEAD))
        .unwrap_or(today);
    (today, end)
}

/// Tally `(date, note_id)` rows per date.
pub fn count_blocks_by_date(rows: &[(NaiveDate, i64)]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for (date, _) in rows {
        *counts.entry(*date).or_insert(0) += 1;
    }
    counts
}

/// Every day in `[start, end]`, grouped year → month → day.
pub fn build_date_tree(
    start: NaiveDate,
    end: NaiveDate,
    counts: &BTreeMap<NaiveDate, usize>,
) -> Vec<YearNode> {
    let mut tree: Vec<YearNode> = Vec::new();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let year_key = date.year().to_string();
        if tree.last().map_or(true, |y| y.key != year_key) {
            tree.push(YearNode {
                key: year_key,
                months: Vec::new(),
            });
        }
        let Some(year) = tree.last_mut() else { continue };

        let month_key = month_key(date);
        if year.months.last().map_or(true, |m| m.key != month_key) {
            year.months.push(MonthNode {
                key: month_key,
                label: date.format("%B").to_string(),
                days: Vec::new(),
            });
        }
        let Some(month) = year.months.last_mut() else { continue };

        month.days.push(DayNode {
            date,
            label: date.format("%-d %a").to_string(),
            count: counts.get(&date).copied().unwrap_or(0),
        });
    }

    tree
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Which year and month nodes are open in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedNodes {
    open: HashSet<String>,
}

impl ExpandedNodes {
    /// Today's year and month start expanded.
    pub fn for_today(today: NaiveDate) -> Self {
        let mut open = HashSet::new();
        open.insert(today.year().to_string());
        open.insert(month_key(today));
        Self { open }
    }

    pub fn is_open(&self, key: &str) -> bool {
        self.open.contains(key)
    }

    pub fn toggle(&mut self, key: &str) {
        if !self.open.remove(key) {
            self.open.insert(key.to_string());
        }
    }

    /// Open the year and month containing `date`.
    pub fn reveal(&mut self, date: NaiveDate) {
        self.open.insert(date.year().to_string());
        self.open.insert(month_key(date));
    }
}
