use std::path::Path;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::error::StoreError;
use crate::model::{Memo, Schedule, Task};

/// Save a schedule to a JSON file.
pub fn save_schedule(schedule: &Schedule, path: &Path) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(schedule)?;
    std::fs::write(path, json).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), tasks = schedule.tasks.len(), "schedule saved");
    Ok(())
}

/// Load a schedule from a JSON file.
pub fn load_schedule(path: &Path) -> Result<Schedule, StoreError> {
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schedule: Schedule = serde_json::from_str(&json).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        tasks = schedule.tasks.len(),
        memos = schedule.memos.len(),
        "schedule loaded"
    );
    Ok(schedule)
}

/// A small schedule around `today`, shown when nothing has been opened.
pub fn sample_schedule(today: NaiveDate) -> Schedule {
    let day = |offset: i64| today + Duration::days(offset);
    let mut schedule = Schedule::new("Sample Schedule");

    let mut design = Task::new("Design", "Wireframes", "Aki", day(-20), day(-6));
    design.progress = 100.0;
    design.actual_dates = (-21..=-8).map(|d| day(d).into()).collect();

    let mut api = Task::new("Dev", "REST API", "Ben", day(-7), day(10));
    api.progress = 40.0;
    api.actual_dates = (-5..=0).map(|d| day(d).into()).collect();

    let mut ui = Task::new("Dev", "Chart view", "Cleo", day(-2), day(20));
    ui.detail = "Virtualized date axis and bar overlay".into();
    ui.actual_dates = vec![day(-4).into(), day(-3).into(), day(-1).into()];

    let review = Task::new("QA", "Acceptance test", "Aki", day(21), day(30));
    let release = Task::new("Ops", "Release", "Dan", day(31), day(33));

    schedule.tasks = vec![design, api, ui, review, release];

    let mut memo = Memo::new_at(400.0, 60.0);
    memo.text = "Drag me. Resize from the corner.".into();
    schedule.memos.push(memo);
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskView;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn save_then_load_keeps_tasks_and_memos() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let schedule = sample_schedule(today());

        save_schedule(&schedule, &path).unwrap();
        let loaded = load_schedule(&path).unwrap();
        assert_eq!(loaded.name, schedule.name);
        assert_eq!(loaded.tasks, schedule.tasks);
        assert_eq!(loaded.memos, schedule.memos);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_schedule(&missing), Err(StoreError::Read { .. })));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ \"tasks\": [ }").unwrap();
        assert!(matches!(load_schedule(&broken), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn upstream_files_with_mixed_actual_dates_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upstream.json");
        std::fs::write(
            &path,
            r#"{
                "name": "Upstream",
                "tasks": [{
                    "id": "t1", "type": "Dev", "name": "API", "assignee": "Aki",
                    "start": "2025-03-01", "end": "2025-03-10", "progress": 30,
                    "actualDates": ["2025-03-01", "2025-03-02T10:00:00+00:00", "soon"]
                }]
            }"#,
        )
        .unwrap();

        let schedule = load_schedule(&path).unwrap();
        assert!(schedule.memos.is_empty());
        let view = TaskView::from_task(&schedule.tasks[0]);
        assert!(view.is_actual("2025-03-01"));
        assert_eq!(schedule.tasks[0].progress, 30.0);
    }
}
