use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::memo::Memo;
use super::task::Task;
use crate::chart::ProgressIntent;

/// The schedule as held by the surrounding state layer: tasks, memos and
/// metadata. The chart only ever reads it and sends intents back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    pub name: String,
    pub tasks: Vec<Task>,
    pub memos: Vec<Memo>,
    pub modified: DateTime<Utc>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            name: "Untitled Schedule".to_string(),
            tasks: Vec::new(),
            memos: Vec::new(),
            modified: Utc::now(),
        }
    }
}

impl Schedule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Replace a memo by id, or append it when it is new.
    pub fn upsert_memo(&mut self, memo: Memo) {
        match self.memos.iter_mut().find(|m| m.id == memo.id) {
            Some(existing) => *existing = memo,
            None => self.memos.push(memo),
        }
        self.touch();
    }

    pub fn remove_memo(&mut self, id: &str) -> bool {
        let before = self.memos.len();
        self.memos.retain(|m| m.id != id);
        let removed = self.memos.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Apply a progress entry from the chart. Returns false for unknown tasks.
    pub fn apply_progress(&mut self, intent: &ProgressIntent) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == intent.task_id) else {
            return false;
        };
        task.record_progress(intent.added_value, intent.date);
        self.touch();
        true
    }
}
