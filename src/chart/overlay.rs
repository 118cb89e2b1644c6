//! Planned and actual bar geometry for the task rows.
//!
//! Bars are positioned in content coordinates of the scroll surface, the
//! same space the date cells live in, so they scroll with the grid.

use tracing::trace;

use super::date_window::DateWindow;
use super::dimensions::DimensionCache;
use crate::model::TaskView;

pub const BAR_HEIGHT: f32 = 10.0;
/// Gap between a raised/lowered bar and the row edge.
pub const LANE_PADDING: f32 = 3.0;

/// Vertical position of a bar inside its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Centered,
    /// Planned days that also have actual progress.
    Raised,
    /// Actual days that fall inside the plan.
    Lowered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBar {
    pub id: String,
    pub task_id: String,
    pub row: usize,
    pub start_idx: usize,
    pub end_idx: usize,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub lane: Lane,
    pub is_out_of_plan: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayBars {
    pub planned: Vec<OverlayBar>,
    pub actual: Vec<OverlayBar>,
}

impl OverlayBars {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.planned.is_empty() && self.actual.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Ready(OverlayBars),
    /// Rows are not laid out yet; try again next frame.
    Deferred,
}

/// Pixel quantities a build pass reads. Snapshotted from the dimension
/// cache so the builder never measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub sticky_width: f32,
    pub header_height: f32,
    pub row_height: f32,
    pub row_step: f32,
    pub column_width: f32,
}

impl BarGeometry {
    pub fn from_cache(dims: &DimensionCache, column_width: f32) -> Self {
        Self {
            sticky_width: dims.sticky_width(),
            header_height: dims.header_height(),
            row_height: dims.row_height(),
            row_step: dims.row_step(),
            column_width,
        }
    }

    fn bar(
        &self,
        id: String,
        task_id: &str,
        row: usize,
        (start_idx, end_idx): (usize, usize),
        lane: Lane,
        is_out_of_plan: bool,
    ) -> OverlayBar {
        let row_top = self.header_height + row as f32 * self.row_step;
        let offset = match lane {
            Lane::Centered => ((self.row_height - BAR_HEIGHT) / 2.0).max(0.0),
            Lane::Raised => LANE_PADDING,
            Lane::Lowered => (self.row_height - LANE_PADDING - BAR_HEIGHT).max(0.0),
        };
        OverlayBar {
            id,
            task_id: task_id.to_string(),
            row,
            start_idx,
            end_idx,
            left: self.sticky_width + start_idx as f32 * self.column_width,
            top: row_top + offset,
            width: (end_idx - start_idx + 1) as f32 * self.column_width,
            height: BAR_HEIGHT,
            lane,
            is_out_of_plan,
        }
    }
}

/// Build bars for `views`, one row each in order. `rendered_rows` is how many
/// body rows the host has laid out; zero with a non-empty task list defers.
pub fn build_overlay_bars(
    views: &[TaskView],
    window: &DateWindow,
    geometry: BarGeometry,
    rendered_rows: usize,
) -> BuildOutcome {
    if rendered_rows == 0 && !views.is_empty() {
        trace!(tasks = views.len(), "rows not rendered yet, deferring bar build");
        return BuildOutcome::Deferred;
    }

    let mut bars = OverlayBars::default();
    for (row, view) in views.iter().enumerate() {
        let Some((plan_start, plan_end)) = window.clip(view.start, view.end) else {
            continue;
        };
        let task_id = view.task.id.as_str();

        for (run, has_actual) in runs(plan_start, plan_end, |idx| {
            window.key(idx).is_some_and(|key| view.is_actual(key))
        }) {
            let lane = if has_actual { Lane::Raised } else { Lane::Centered };
            let id = format!("p-{row}-{}-{}", run.0, run.1);
            bars.planned.push(geometry.bar(id, task_id, row, run, lane, false));
        }

        let mut actual: Vec<usize> = view
            .actual_day_keys
            .iter()
            .filter_map(|key| window.index_of_key(key))
            .collect();
        actual.sort_unstable();
        for run in contiguous(&actual) {
            let overlaps_plan = match (window.day(run.0), window.day(run.1)) {
                (Some(first), Some(last)) => first <= view.end && last >= view.start,
                _ => false,
            };
            let lane = if overlaps_plan { Lane::Lowered } else { Lane::Centered };
            let id = format!("a-{row}-{}-{}", run.0, run.1);
            bars.actual
                .push(geometry.bar(id, task_id, row, run, lane, !overlaps_plan));
        }
    }
    trace!(
        planned = bars.planned.len(),
        actual = bars.actual.len(),
        "overlay bars built"
    );
    BuildOutcome::Ready(bars)
}

/// Maximal runs of `[start, end]` sharing the same `flag` value.
fn runs(start: usize, end: usize, flag: impl Fn(usize) -> bool) -> Vec<((usize, usize), bool)> {
    let mut out = Vec::new();
    let mut run_start = start;
    let mut current = flag(start);
    for idx in start + 1..=end {
        let value = flag(idx);
        if value != current {
            out.push(((run_start, idx - 1), current));
            run_start = idx;
            current = value;
        }
    }
    out.push(((run_start, end), current));
    out
}

/// Maximal runs of consecutive values in a sorted index list.
fn contiguous(sorted: &[usize]) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &idx in sorted {
        match out.last_mut() {
            Some(run) if run.1 + 1 == idx => run.1 = idx,
            Some(run) if run.1 == idx => {}
            _ => out.push((idx, idx)),
        }
    }
    out
}
