//! The materialized span of calendar days backing the chart's horizontal axis.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::model::calendar::{self, add_days, add_months, date_to_key, diff_days};

/// One month group in the two-row date header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    /// `YYYY-MM`
    pub label: String,
    pub days: usize,
    pub month: u32,
}

/// Contiguous, gap-free sequence of days `[range_start, range_end]` with a
/// parallel `YYYY-MM-DD` key list and key-to-index map.
///
/// Every mutation rebuilds days, keys and index together before returning.
#[derive(Debug, Clone)]
pub struct DateWindow {
    range_start: NaiveDate,
    range_end: NaiveDate,
    days: Vec<NaiveDate>,
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl DateWindow {
    /// `[today - months_past, today + months_future]`.
    pub fn initialize(today: NaiveDate, months_past: u32, months_future: u32) -> Self {
        let start = add_months(today, -(months_past as i32));
        let end = add_months(today, months_future as i32);
        Self::from_range(start, end)
    }

    /// Window over an explicit inclusive range. A reversed range collapses
    /// to the single day `start`.
    pub fn from_range(start: NaiveDate, end: NaiveDate) -> Self {
        let mut window = Self {
            range_start: start,
            range_end: end.max(start),
            days: Vec::new(),
            keys: Vec::new(),
            index: HashMap::new(),
        };
        window.rebuild();
        window
    }

    pub fn range_start(&self) -> NaiveDate {
        self.range_start
    }

    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[cfg(test)]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn day(&self, idx: usize) -> Option<NaiveDate> {
        self.days.get(idx).copied()
    }

    pub fn key(&self, idx: usize) -> Option<&str> {
        self.keys.get(idx).map(String::as_str)
    }

    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn index_of(&self, day: NaiveDate) -> Option<usize> {
        self.index_of_key(&date_to_key(day))
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.range_start && day <= self.range_end
    }

    /// Append `days` days after `range_end`. Returns false, leaving the
    /// window untouched, when the new edge is not a representable date.
    pub fn extend_right(&mut self, days: usize) -> bool {
        if days == 0 {
            return false;
        }
        let Some(end) = add_days(self.range_end, days as i64) else {
            warn!(days, end = %self.range_end, "cannot extend past the last representable day");
            return false;
        };
        self.range_end = end;
        self.rebuild();
        true
    }

    /// Prepend `days` days before `range_start`. Same failure rule as
    /// [`DateWindow::extend_right`].
    pub fn extend_left(&mut self, days: usize) -> bool {
        if days == 0 {
            return false;
        }
        let Some(start) = add_days(self.range_start, -(days as i64)) else {
            warn!(
                days,
                start = %self.range_start,
                "cannot extend before the first representable day"
            );
            return false;
        };
        self.range_start = start;
        self.rebuild();
        true
    }

    /// Drop `days` days from the left edge. No-op (returns false) when that
    /// would leave the window empty.
    pub fn prune_left(&mut self, days: usize) -> bool {
        if days == 0 || days >= self.len() {
            return false;
        }
        match self.day(days) {
            Some(start) => self.range_start = start,
            None => return false,
        }
        self.rebuild();
        true
    }

    /// Drop `days` days from the right edge. No-op (returns false) when that
    /// would leave the window empty.
    pub fn prune_right(&mut self, days: usize) -> bool {
        if days == 0 || days >= self.len() {
            return false;
        }
        match self.day(self.len() - 1 - days) {
            Some(end) => self.range_end = end,
            None => return false,
        }
        self.rebuild();
        true
    }

    /// Re-materialize the initial window moved by `offset` whole spans, one
    /// span being `months_past + months_future` months.
    pub fn shift_span(
        &mut self,
        today: NaiveDate,
        months_past: u32,
        months_future: u32,
        offset: i32,
    ) {
        let span = (months_past + months_future) as i32;
        let center = add_months(today, offset * span);
        self.range_start = add_months(center, -(months_past as i32));
        self.range_end = add_months(center, months_future as i32);
        self.rebuild();
    }

    /// Index bounds of `[start, end]` clipped to the window, or `None` when
    /// the range lies entirely outside it (or is reversed).
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<(usize, usize)> {
        if start > end || end < self.range_start || start > self.range_end {
            return None;
        }
        let first = start.max(self.range_start);
        let last = end.min(self.range_end);
        Some((
            diff_days(self.range_start, first) as usize,
            diff_days(self.range_start, last) as usize,
        ))
    }

    /// Month groups for the header, in window order.
    pub fn months(&self) -> Vec<MonthGroup> {
        let mut groups: Vec<MonthGroup> = Vec::new();
        for day in &self.days {
            let label = format!("{:04}-{:02}", day.year(), day.month());
            match groups.last_mut() {
                Some(last) if last.label == label => last.days += 1,
                _ => groups.push(MonthGroup {
                    label,
                    days: 1,
                    month: day.month(),
                }),
            }
        }
        groups
    }

    pub fn is_weekend(&self, idx: usize) -> bool {
        self.day(idx).is_some_and(calendar::is_weekend)
    }

    pub fn is_today(&self, idx: usize, today: NaiveDate) -> bool {
        self.day(idx) == Some(today)
    }

    fn rebuild(&mut self) {
        let count = diff_days(self.range_start, self.range_end) + 1;
        let count = count.max(0) as usize;
        let mut days = Vec::with_capacity(count);
        let mut keys = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);
        for (i, day) in self.range_start.iter_days().take(count).enumerate() {
            let key = date_to_key(day);
            index.insert(key.clone(), i);
            keys.push(key);
            days.push(day);
        }
        self.days = days;
        self.keys = keys;
        self.index = index;
        debug!(
            start = %self.range_start,
            end = %self.range_end,
            days = count,
            "date window rebuilt"
        );
    }
}
