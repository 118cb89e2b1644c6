//! Per-column option filters for the task table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterColumn {
    Type,
    Name,
    Assignee,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 3] = [FilterColumn::Type, FilterColumn::Name, FilterColumn::Assignee];

    pub fn label(&self) -> &'static str {
        match self {
            FilterColumn::Type => "Type",
            FilterColumn::Name => "Name",
            FilterColumn::Assignee => "Assignee",
        }
    }

    pub fn value_of<'a>(&self, task: &'a Task) -> &'a str {
        match self {
            FilterColumn::Type => &task.classification,
            FilterColumn::Name => &task.name,
            FilterColumn::Assignee => &task.assignee,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub all_options: BTreeSet<String>,
    pub selected: BTreeSet<String>,
    pub keyword_prefix: String,
}

impl FilterState {
    /// True when some option is deselected.
    pub fn is_active(&self) -> bool {
        self.selected.len() < self.all_options.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    states: BTreeMap<FilterColumn, FilterState>,
}

impl FilterEngine {
    /// Collect the distinct values per column and select all of them.
    pub fn rebuild(&mut self, tasks: &[Task]) {
        self.states.clear();
        for column in FilterColumn::ALL {
            let all_options: BTreeSet<String> = tasks
                .iter()
                .map(|task| column.value_of(task).to_string())
                .collect();
            self.states.insert(
                column,
                FilterState {
                    selected: all_options.clone(),
                    all_options,
                    keyword_prefix: String::new(),
                },
            );
        }
        debug!(tasks = tasks.len(), "filters rebuilt");
    }

    pub fn state(&self, column: FilterColumn) -> Option<&FilterState> {
        self.states.get(&column)
    }

    /// Include or exclude `option`. Unknown options are ignored so the
    /// selection stays a subset of the known options.
    pub fn set_selected(&mut self, column: FilterColumn, option: &str, included: bool) {
        let Some(state) = self.states.get_mut(&column) else {
            return;
        };
        if included {
            if state.all_options.contains(option) {
                state.selected.insert(option.to_string());
            }
        } else {
            state.selected.remove(option);
        }
    }

    pub fn select_all(&mut self, column: FilterColumn, included: bool) {
        if let Some(state) = self.states.get_mut(&column) {
            state.selected = if included {
                state.all_options.clone()
            } else {
                BTreeSet::new()
            };
        }
    }

    pub fn set_keyword(&mut self, column: FilterColumn, prefix: &str) {
        if let Some(state) = self.states.get_mut(&column) {
            state.keyword_prefix = prefix.to_string();
        }
    }

    /// Options starting with the column's keyword, case-sensitive.
    pub fn filtered_options(&self, column: FilterColumn) -> Vec<&str> {
        self.states
            .get(&column)
            .map(|state| {
                state
                    .all_options
                    .iter()
                    .filter(|option| option.starts_with(state.keyword_prefix.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tasks whose value in every column is selected.
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        tasks
            .into_iter()
            .filter(|task| {
                self.states
                    .iter()
                    .all(|(column, state)| state.selected.contains(column.value_of(task)))
            })
            .collect()
    }

    pub fn is_active(&self, column: FilterColumn) -> bool {
        self.states.get(&column).is_some_and(FilterState::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn tasks() -> Vec<Task> {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        vec![
            Task::new("Dev", "API", "Aki", day, day),
            Task::new("Dev", "UI", "Ben", day, day),
            Task::new("Ops", "Deploy", "Aki", day, day),
            Task::new("Design", "Mockups", "Cleo", day, day),
        ]
    }

    fn names(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.name.clone()).collect()
    }

    #[test]
    fn rebuild_selects_everything() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        assert_eq!(engine.apply(&tasks).len(), 4);
        for column in FilterColumn::ALL {
            assert!(!engine.is_active(column));
        }
    }

    #[test]
    fn deselecting_an_option_hides_its_tasks() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        engine.set_selected(FilterColumn::Assignee, "Aki", false);
        assert!(engine.is_active(FilterColumn::Assignee));
        assert_eq!(names(&engine.apply(&tasks)), vec!["UI", "Mockups"]);

        engine.set_selected(FilterColumn::Type, "Design", false);
        assert_eq!(names(&engine.apply(&tasks)), vec!["UI"]);
    }

    #[test]
    fn apply_is_idempotent() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        engine.set_selected(FilterColumn::Type, "Dev", false);
        let once: Vec<Task> = engine.apply(&tasks).into_iter().cloned().collect();
        let twice = engine.apply(&once);
        assert_eq!(names(&twice), names(&once.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn selection_stays_within_known_options() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        engine.set_selected(FilterColumn::Name, "Nonexistent", true);
        let state = engine.state(FilterColumn::Name).unwrap();
        assert!(state.selected.is_subset(&state.all_options));
    }

    #[test]
    fn keyword_filters_options_by_prefix_only() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        engine.set_keyword(FilterColumn::Type, "De");
        assert_eq!(engine.filtered_options(FilterColumn::Type), vec!["Design", "Dev"]);
        engine.set_keyword(FilterColumn::Type, "ev");
        assert!(engine.filtered_options(FilterColumn::Type).is_empty());
        engine.set_keyword(FilterColumn::Type, "de");
        assert!(engine.filtered_options(FilterColumn::Type).is_empty());
    }

    #[test]
    fn rebuild_resets_selection_and_keyword() {
        let tasks = tasks();
        let mut engine = FilterEngine::default();
        engine.rebuild(&tasks);
        engine.select_all(FilterColumn::Assignee, false);
        engine.set_keyword(FilterColumn::Assignee, "A");
        assert!(engine.apply(&tasks).is_empty());

        engine.rebuild(&tasks[..2]);
        let state = engine.state(FilterColumn::Assignee).unwrap();
        assert_eq!(state.keyword_prefix, "");
        assert_eq!(state.selected.len(), 2);
        assert_eq!(engine.apply(&tasks[..2]).len(), 2);
    }
}
