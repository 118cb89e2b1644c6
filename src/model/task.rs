use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calendar;

/// One recorded "actual progress" day as supplied upstream.
///
/// Upstream mixes typed dates and `YYYY-MM-DD` strings; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActualDate {
    /// A calendar day.
    Day(NaiveDate),
    /// A timestamp with an offset; normalized to the local calendar day.
    Moment(DateTime<FixedOffset>),
    /// Any other string, parsed leniently.
    Raw(String),
}

impl ActualDate {
    /// Local calendar day this entry refers to, or `None` when the entry is
    /// unparseable.
    pub fn to_day(&self) -> Option<NaiveDate> {
        match self {
            ActualDate::Day(day) => Some(*day),
            ActualDate::Moment(moment) => Some(moment.with_timezone(&Local).date_naive()),
            ActualDate::Raw(text) => calendar::parse_key(text).or_else(|| {
                let parsed = calendar::parse_loose(text);
                match parsed {
                    Some(day) => warn!(
                        entry = %text,
                        day = %calendar::date_to_key(day),
                        "actual date is not YYYY-MM-DD, used lenient parse"
                    ),
                    None => warn!(entry = %text, "dropping unparseable actual date"),
                }
                parsed
            }),
        }
    }
}

impl From<NaiveDate> for ActualDate {
    fn from(day: NaiveDate) -> Self {
        ActualDate::Day(day)
    }
}

impl From<&str> for ActualDate {
    fn from(text: &str) -> Self {
        ActualDate::Raw(text.to_string())
    }
}

/// A scheduled task as supplied by the task source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Classification shown in the "type" column.
    #[serde(rename = "type")]
    pub classification: String,
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub assignee: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Accumulated progress, 0 to 100. Tracked independently of `actual_dates`.
    #[serde(default)]
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actual_dates: Vec<ActualDate>,
}

impl Task {
    pub fn new(
        classification: impl Into<String>,
        name: impl Into<String>,
        assignee: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            classification: classification.into(),
            name: name.into(),
            detail: String::new(),
            assignee: assignee.into(),
            start,
            end,
            progress: 0.0,
            actual_dates: Vec::new(),
        }
    }

    /// Adds to the progress percentage (capped at 100) and marks `date` as
    /// an actual day. The two signals are never derived from each other.
    pub fn record_progress(&mut self, added: f32, date: NaiveDate) {
        self.progress = (self.progress + added).clamp(0.0, 100.0);
        let already = self
            .actual_dates
            .iter()
            .any(|entry| entry.to_day() == Some(date));
        if !already {
            self.actual_dates.push(ActualDate::Day(date));
        }
    }
}

/// Read-only projection of a task used to build chart geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub task: Task,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub actual_day_keys: HashSet<String>,
}

impl TaskView {
    pub fn from_task(task: &Task) -> Self {
        let actual_day_keys = task
            .actual_dates
            .iter()
            .filter_map(ActualDate::to_day)
            .map(calendar::date_to_key)
            .collect();
        Self {
            task: task.clone(),
            start: task.start,
            end: task.end,
            actual_day_keys,
        }
    }

    pub fn is_actual(&self, key: &str) -> bool {
        self.actual_day_keys.contains(key)
    }
}
