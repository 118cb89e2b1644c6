//! Wires host input (scroll, wheel, resize, pointer gestures) to the date
//! window, the maintainer and the overlay builder, and collects the intents
//! the chart sends back to the schedule owner.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::date_window::DateWindow;
use super::dimensions::{DimensionCache, LayoutProbe};
use super::filter::{FilterColumn, FilterEngine};
use super::maintainer::{MaintenanceReport, Slack, ViewGeometry, WindowMaintainer};
use super::overlay::{build_overlay_bars, BarGeometry, BuildOutcome, OverlayBars};
use super::scroll_anchor::ScrollSurface;
use crate::config::ChartSettings;
use crate::error::ConfigError;
use crate::model::memo::{MIN_MEMO_HEIGHT, MIN_MEMO_WIDTH};
use crate::model::{Memo, Task, TaskView};

/// Smallest vertical page step in pixels.
const MIN_PAGE_STEP: f32 = 40.0;

/// Progress entered for one task on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressIntent {
    pub task_id: String,
    pub added_value: f32,
    pub date: NaiveDate,
}

/// Everything the chart reports to the schedule owner.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    RangeChanged { start: NaiveDate, end: NaiveDate },
    MemoChanged(Memo),
    MemoDeleted(String),
    ProgressInput(ProgressIntent),
    TaskClicked(String),
}

/// Input streams the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Listener {
    Scroll,
    Wheel,
    Resize,
    PointerMove,
    PointerUp,
}

/// The set of currently held subscriptions. Input on a stream that is not
/// held is dropped.
#[derive(Debug, Default)]
pub struct Listeners {
    active: BTreeSet<Listener>,
}

impl Listeners {
    pub fn acquire(&mut self, listener: Listener) -> bool {
        self.active.insert(listener)
    }

    pub fn release(&mut self, listener: Listener) -> bool {
        self.active.remove(&listener)
    }

    /// Returns how many were held.
    pub fn release_all(&mut self) -> usize {
        let held = self.active.len();
        self.active.clear();
        held
    }

    pub fn is_active(&self, listener: Listener) -> bool {
        self.active.contains(&listener)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// A wheel tick, in pixels, with browser sign conventions (positive `delta_y`
/// scrolls down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_x: f32,
    pub delta_y: f32,
    pub shift: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum MemoGesture {
    Drag {
        memo: Memo,
        grab_offset: (f32, f32),
    },
    Resize {
        memo: Memo,
        pointer_start: (f32, f32),
        size_start: (f32, f32),
    },
}

impl MemoGesture {
    fn memo(&self) -> &Memo {
        match self {
            MemoGesture::Drag { memo, .. } | MemoGesture::Resize { memo, .. } => memo,
        }
    }

    fn into_memo(self) -> Memo {
        match self {
            MemoGesture::Drag { memo, .. } | MemoGesture::Resize { memo, .. } => memo,
        }
    }
}

/// An open progress cell editor. The day is fixed when the edit starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEdit {
    pub row: usize,
    pub task_id: String,
    pub date: NaiveDate,
}

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    pub maintenance: MaintenanceReport,
    pub bars_rebuilt: bool,
    /// Ask the host for another frame after this long, if set.
    pub repaint_after: Option<Duration>,
}

impl FrameReport {
    pub fn window_changed(&self) -> bool {
        self.maintenance.window_changed()
    }
}

pub struct ViewportController {
    today: NaiveDate,
    column_width: f32,
    months_past: u32,
    months_future: u32,
    span_offset: i32,
    window: DateWindow,
    dims: DimensionCache,
    maintainer: WindowMaintainer,
    filters: FilterEngine,
    filter_popup: Option<FilterColumn>,
    tasks: Vec<Task>,
    views: Vec<TaskView>,
    bars: OverlayBars,
    bars_stale: bool,
    layout_dirty: bool,
    listeners: Listeners,
    memos: Vec<Memo>,
    gesture: Option<MemoGesture>,
    editing: Option<ProgressEdit>,
    /// Body cell last pressed, held by day so it survives window changes.
    focused: Option<(usize, NaiveDate)>,
    mounted: bool,
    auto_centered: bool,
    ready: bool,
    pending_center: Option<usize>,
    pending_pages: i32,
    events: Vec<ChartEvent>,
}

impl ViewportController {
    pub fn new(today: NaiveDate, settings: &ChartSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let window = DateWindow::initialize(today, settings.months_past, settings.months_future);
        let mut controller = Self {
            today,
            column_width: settings.column_width,
            months_past: settings.months_past,
            months_future: settings.months_future,
            span_offset: 0,
            window,
            dims: DimensionCache::default(),
            maintainer: WindowMaintainer::new(settings.policy(), settings.idle_mode),
            filters: FilterEngine::default(),
            filter_popup: None,
            tasks: Vec::new(),
            views: Vec::new(),
            bars: OverlayBars::default(),
            bars_stale: true,
            layout_dirty: true,
            listeners: Listeners::default(),
            memos: Vec::new(),
            gesture: None,
            editing: None,
            focused: None,
            mounted: false,
            auto_centered: false,
            ready: false,
            pending_center: None,
            pending_pages: 0,
            events: Vec::new(),
        };
        controller.emit_range();
        Ok(controller)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// The host surface exists; start listening.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.listeners.acquire(Listener::Scroll);
        self.listeners.acquire(Listener::Wheel);
        self.listeners.acquire(Listener::Resize);
        self.layout_dirty = true;
        self.maintainer.request_sample();
        info!(
            start = %self.window.range_start(),
            end = %self.window.range_end(),
            "chart mounted"
        );
    }

    /// Release every listener and drop pending work, including a gesture in
    /// progress (its memo is not emitted).
    pub fn teardown(&mut self) {
        let released = self.listeners.release_all();
        self.maintainer.cancel();
        let dropped_gesture = self.gesture.take().is_some();
        self.editing = None;
        self.pending_center = None;
        self.pending_pages = 0;
        self.mounted = false;
        debug!(released, dropped_gesture, "chart torn down");
    }

    /// False until the first centring has happened.
    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[cfg(test)]
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    // ── Data ────────────────────────────────────────────────────

    /// Replace the task list. Filters reset to "everything selected".
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.filters.rebuild(&tasks);
        self.tasks = tasks;
        self.refresh_views();
    }

    /// Replace the memos drawn over the chart.
    pub fn set_memos(&mut self, memos: Vec<Memo>) {
        self.memos = memos;
    }

    pub fn memos(&self) -> &[Memo] {
        &self.memos
    }

    pub fn views(&self) -> &[TaskView] {
        &self.views
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn filter_popup(&self) -> Option<FilterColumn> {
        self.filter_popup
    }

    pub fn toggle_filter_popup(&mut self, column: FilterColumn) {
        self.filter_popup = if self.filter_popup == Some(column) {
            None
        } else {
            Some(column)
        };
    }

    pub fn close_filter_popup(&mut self) {
        self.filter_popup = None;
    }

    pub fn set_filter_selected(&mut self, column: FilterColumn, option: &str, included: bool) {
        self.filters.set_selected(column, option, included);
        self.refresh_views();
    }

    pub fn select_all_filter(&mut self, column: FilterColumn, included: bool) {
        self.filters.select_all(column, included);
        self.refresh_views();
    }

    pub fn set_filter_keyword(&mut self, column: FilterColumn, prefix: &str) {
        self.filters.set_keyword(column, prefix);
    }

    fn refresh_views(&mut self) {
        self.views = self
            .filters
            .apply(&self.tasks)
            .into_iter()
            .map(TaskView::from_task)
            .collect();
        self.layout_dirty = true;
        self.bars_stale = true;
    }

    // ── Geometry accessors ──────────────────────────────────────

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn dims(&self) -> &DimensionCache {
        &self.dims
    }

    pub fn bars(&self) -> &OverlayBars {
        &self.bars
    }

    pub fn column_width(&self) -> f32 {
        self.column_width
    }

    #[cfg(test)]
    pub fn span_offset(&self) -> i32 {
        self.span_offset
    }

    /// Width of the pinned columns plus every materialized day.
    pub fn content_width(&self) -> f32 {
        self.dims.sticky_width() + self.window.len() as f32 * self.column_width
    }

    pub fn content_height(&self) -> f32 {
        self.dims.header_height() + self.views.len() as f32 * self.dims.row_step()
    }

    /// Content position of today's column, at the top of the body.
    pub fn today_column_position(&self) -> Option<(f32, f32)> {
        let idx = self.window.index_of(self.today)?;
        Some((
            self.dims.sticky_width() + idx as f32 * self.column_width,
            self.dims.header_height(),
        ))
    }

    /// Where a new memo goes: the focused cell, or today's column when no
    /// cell is focused or its day has left the window.
    pub fn new_memo_position(&self) -> Option<(f32, f32)> {
        self.focused_cell_position()
            .or_else(|| self.today_column_position())
    }

    fn focused_cell_position(&self) -> Option<(f32, f32)> {
        let (row, date) = self.focused?;
        if row >= self.views.len() {
            return None;
        }
        let idx = self.window.index_of(date)?;
        Some((
            self.dims.sticky_width() + idx as f32 * self.column_width,
            self.dims.row_top(row),
        ))
    }

    // ── Input ───────────────────────────────────────────────────

    pub fn on_scroll(&mut self, now: Instant) {
        if self.listeners.is_active(Listener::Scroll) {
            self.maintainer.on_scroll(now);
        }
    }

    /// Shift + vertical wheel scrolls horizontally. Returns true when the
    /// wheel was consumed and the host must not scroll vertically.
    pub fn on_wheel(
        &mut self,
        now: Instant,
        input: WheelInput,
        surface: &mut dyn ScrollSurface,
    ) -> bool {
        if !self.listeners.is_active(Listener::Wheel) {
            return false;
        }
        if input.shift && input.delta_y.abs() > input.delta_x.abs() {
            surface.set_scroll_left(surface.scroll_left() + input.delta_y);
            self.on_scroll(now);
            return true;
        }
        false
    }

    pub fn on_resize(&mut self) {
        if self.listeners.is_active(Listener::Resize) {
            self.layout_dirty = true;
            self.maintainer.request_sample();
        }
    }

    // ── Navigation ──────────────────────────────────────────────

    /// Centre `day` in the visible date area on the next frame. Days outside
    /// the window are ignored.
    pub fn scroll_to_date(&mut self, day: NaiveDate) {
        if let Some(idx) = self.window.index_of(day) {
            self.pending_center = Some(idx);
        }
    }

    pub fn scroll_to_today(&mut self) {
        self.scroll_to_date(self.today);
    }

    /// Move the whole window by one span and scroll to its start.
    pub fn move_span(&mut self, direction: i32) {
        if direction == 0 {
            return;
        }
        self.span_offset += direction.signum();
        self.window.shift_span(
            self.today,
            self.months_past,
            self.months_future,
            self.span_offset,
        );
        self.maintainer.cancel();
        self.bars_stale = true;
        self.emit_range();
        self.pending_center = Some(0);
        info!(offset = self.span_offset, "moved span");
    }

    /// Page up (negative) or down (positive) on the next frame.
    pub fn scroll_vertical_by_page(&mut self, direction: i32) {
        self.pending_pages += direction.signum();
    }

    // ── Memo gestures ───────────────────────────────────────────

    /// Start dragging `memo`; `pointer` is in content coordinates.
    pub fn begin_memo_drag(&mut self, memo: &Memo, pointer: (f32, f32)) -> bool {
        if !self.mounted || self.gesture.is_some() {
            return false;
        }
        self.acquire_pointer();
        self.gesture = Some(MemoGesture::Drag {
            memo: memo.clone(),
            grab_offset: (pointer.0 - memo.x, pointer.1 - memo.y),
        });
        true
    }

    pub fn begin_memo_resize(&mut self, memo: &Memo, pointer: (f32, f32)) -> bool {
        if !self.mounted || self.gesture.is_some() {
            return false;
        }
        self.acquire_pointer();
        self.gesture = Some(MemoGesture::Resize {
            memo: memo.clone(),
            pointer_start: pointer,
            size_start: (memo.width, memo.height),
        });
        true
    }

    /// The memo being dragged or resized, in its live state.
    pub fn active_memo(&self) -> Option<&Memo> {
        self.gesture.as_ref().map(MemoGesture::memo)
    }

    /// Track the pointer. Drag positions stay inside the date area, between
    /// the pinned columns/header and the content's far edges.
    pub fn pointer_moved(&mut self, pointer: (f32, f32), surface: &dyn ScrollSurface) {
        if !self.listeners.is_active(Listener::PointerMove) {
            return;
        }
        let sticky = self.dims.sticky_width();
        let header = self.dims.header_height();
        match self.gesture.as_mut() {
            Some(MemoGesture::Drag { memo, grab_offset }) => {
                let max_x = surface.scroll_width() - memo.width;
                let max_y = surface.scroll_height() - memo.height;
                memo.x = (pointer.0 - grab_offset.0).max(sticky).min(max_x);
                memo.y = (pointer.1 - grab_offset.1).max(header).min(max_y);
            }
            Some(MemoGesture::Resize {
                memo,
                pointer_start,
                size_start,
            }) => {
                memo.width = (size_start.0 + pointer.0 - pointer_start.0).max(MIN_MEMO_WIDTH);
                memo.height = (size_start.1 + pointer.1 - pointer_start.1).max(MIN_MEMO_HEIGHT);
            }
            None => {}
        }
    }

    /// Finish the gesture and emit the final memo.
    pub fn pointer_released(&mut self) -> Option<Memo> {
        if !self.listeners.is_active(Listener::PointerUp) {
            return None;
        }
        self.listeners.release(Listener::PointerMove);
        self.listeners.release(Listener::PointerUp);
        let memo = self.gesture.take()?.into_memo();
        debug!(memo = %memo.id, x = memo.x, y = memo.y, "memo gesture finished");
        self.store_memo(memo.clone());
        Some(memo)
    }

    /// Text or content edits made outside a gesture, and new memos.
    pub fn edit_memo(&mut self, memo: Memo) {
        self.store_memo(memo);
    }

    pub fn delete_memo(&mut self, id: &str) {
        self.memos.retain(|memo| memo.id != id);
        self.events.push(ChartEvent::MemoDeleted(id.to_string()));
    }

    fn store_memo(&mut self, memo: Memo) {
        match self.memos.iter_mut().find(|stored| stored.id == memo.id) {
            Some(stored) => *stored = memo.clone(),
            None => self.memos.push(memo.clone()),
        }
        self.events.push(ChartEvent::MemoChanged(memo));
    }

    /// Move memos with their days when the window's left edge moved by
    /// `days` (positive when days were prepended).
    fn shift_memos(&mut self, days: i64) {
        if days == 0 {
            return;
        }
        let dx = days as f32 * self.column_width;
        for memo in &mut self.memos {
            memo.x += dx;
            self.events.push(ChartEvent::MemoChanged(memo.clone()));
        }
        match self.gesture.as_mut() {
            Some(MemoGesture::Drag { memo, .. }) => memo.x += dx,
            Some(MemoGesture::Resize {
                memo,
                pointer_start,
                ..
            }) => {
                memo.x += dx;
                pointer_start.0 += dx;
            }
            None => {}
        }
        debug!(days, memos = self.memos.len(), "memos moved with the left edge");
    }

    fn acquire_pointer(&mut self) {
        self.listeners.acquire(Listener::PointerMove);
        self.listeners.acquire(Listener::PointerUp);
    }

    // ── Progress cells ──────────────────────────────────────────

    pub fn begin_progress_edit(&mut self, row: usize, col: usize) -> bool {
        let (Some(view), Some(date)) = (self.views.get(row), self.window.day(col)) else {
            return false;
        };
        self.editing = Some(ProgressEdit {
            row,
            task_id: view.task.id.clone(),
            date,
        });
        true
    }

    pub fn progress_edit(&self) -> Option<&ProgressEdit> {
        self.editing.as_ref()
    }

    /// Close the editor. Only a positive number produces an intent.
    pub fn commit_progress(&mut self, input: &str) -> Option<ProgressIntent> {
        let edit = self.editing.take()?;
        let value = input.trim().parse::<f32>().ok()?;
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        let intent = ProgressIntent {
            task_id: edit.task_id,
            added_value: value,
            date: edit.date,
        };
        self.events.push(ChartEvent::ProgressInput(intent.clone()));
        Some(intent)
    }

    pub fn cancel_progress_edit(&mut self) {
        self.editing = None;
    }

    /// A body cell was pressed; a new memo will be placed there.
    pub fn focus_cell(&mut self, row: usize, col: usize) {
        if let Some(date) = self.window.day(col) {
            self.focused = Some((row, date));
        }
    }

    pub fn row_clicked(&mut self, row: usize) {
        if let Some(view) = self.views.get(row) {
            self.events.push(ChartEvent::TaskClicked(view.task.id.clone()));
        }
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Frame ───────────────────────────────────────────────────

    /// Run one frame: measure if the layout changed, apply queued
    /// navigation, sample the scroll position, run idle maintenance and
    /// rebuild stale bars. A no-op until mounted.
    pub fn frame(
        &mut self,
        now: Instant,
        surface: &mut dyn ScrollSurface,
        probe: &dyn LayoutProbe,
        host_idle: bool,
        rendered_rows: usize,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        if !self.mounted {
            return report;
        }

        if self.layout_dirty && self.dims.refresh(probe) {
            self.layout_dirty = false;
            self.bars_stale = true;
        }

        self.maybe_auto_center(surface);
        self.apply_navigation(now, surface);

        let geometry = self.view_geometry(surface);
        if self.maintainer.take_sample() {
            let slack = Slack::measure(
                surface.scroll_left(),
                geometry.visible_width,
                self.column_width,
                self.window.len(),
            );
            self.maintainer.evaluate(slack, self.window.len());
        }

        report.maintenance =
            self.maintainer
                .run_idle(now, host_idle, &mut self.window, surface, geometry);
        if report.window_changed() {
            let maintenance = report.maintenance;
            let left_shift = maintenance.extended_left as i64 - maintenance.pruned_left as i64;
            self.shift_memos(left_shift);
            self.emit_range();
            self.layout_dirty = true;
            self.bars_stale = true;
        }

        if self.bars_stale {
            let geometry = BarGeometry::from_cache(&self.dims, self.column_width);
            match build_overlay_bars(&self.views, &self.window, geometry, rendered_rows) {
                BuildOutcome::Ready(bars) => {
                    self.bars = bars;
                    self.bars_stale = false;
                    report.bars_rebuilt = true;
                }
                BuildOutcome::Deferred => {}
            }
        }

        report.repaint_after = [
            self.maintainer.wake_after(now),
            (self.bars_stale || self.layout_dirty).then_some(Duration::ZERO),
            (self.pending_center.is_some() || !self.ready).then_some(Duration::ZERO),
        ]
        .into_iter()
        .flatten()
        .min();
        report
    }

    fn view_geometry(&self, surface: &dyn ScrollSurface) -> ViewGeometry {
        ViewGeometry {
            column_width: self.column_width,
            visible_width: (surface.client_width() - self.dims.sticky_width()).max(0.0),
        }
    }

    /// Queue the one-time centring on today, on the first frame with a
    /// visible date area and something to scroll. A window without today is
    /// ready as soon as that geometry exists.
    fn maybe_auto_center(&mut self, surface: &dyn ScrollSurface) {
        if self.auto_centered {
            return;
        }
        let visible = surface.client_width() - self.dims.sticky_width();
        let max_scroll = surface.scroll_width() - surface.client_width();
        if visible <= 0.0 || max_scroll <= 0.0 {
            return;
        }
        self.auto_centered = true;
        self.scroll_to_today();
        if self.pending_center.is_none() {
            self.ready = true;
        }
    }

    fn apply_navigation(&mut self, now: Instant, surface: &mut dyn ScrollSurface) {
        let visible = (surface.client_width() - self.dims.sticky_width()).max(0.0);
        let max_scroll = (surface.scroll_width() - surface.client_width()).max(0.0);

        if let Some(idx) = self.pending_center {
            if visible > 0.0 {
                self.pending_center = None;
                let cell_left = surface
                    .rendered_cell_left(idx)
                    .unwrap_or(idx as f32 * self.column_width);
                let desired = cell_left + self.column_width / 2.0 - visible / 2.0;
                surface.set_scroll_left(desired.round().max(0.0).min(max_scroll));
                self.ready = true;
                self.maintainer.on_scroll(now);
            }
        }

        if self.pending_pages != 0 {
            let direction = std::mem::take(&mut self.pending_pages);
            let page = ((surface.client_height() - self.dims.header_height()) * 0.9)
                .max(MIN_PAGE_STEP);
            let max_top = (surface.scroll_height() - surface.client_height()).max(0.0);
            let top = surface.scroll_top() + direction as f32 * page;
            surface.set_scroll_top(top.max(0.0).min(max_top));
        }
    }

    fn emit_range(&mut self) {
        self.events.push(ChartEvent::RangeChanged {
            start: self.window.range_start(),
            end: self.window.range_end(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::dimensions::tests::FakeProbe;
    use crate::chart::scroll_anchor::tests::FakeSurface;
    use crate::chart::scheduler::IdleMode;
    use crate::chart::scroll_anchor::ScrollAnchor;
    use crate::model::calendar::add_days;
    use pretty_assertions::assert_eq;

    const STICKY: f32 = 350.0;
    const HEADER: f32 = 44.0;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2025, 6, 15)
    }

    fn probe() -> FakeProbe {
        FakeProbe {
            mounted: true,
            sticky: vec![90.0, 160.0, 100.0],
            header: HEADER,
            rows: vec![(HEADER, 24.0), (HEADER + 25.0, 24.0)],
        }
    }

    fn surface_for(controller: &ViewportController) -> FakeSurface {
        FakeSurface {
            client: (STICKY + 720.0, 400.0),
            content: (
                STICKY + controller.window().len() as f32 * 36.0,
                HEADER + 100.0 * 25.0,
            ),
            column_width: 36.0,
            ..Default::default()
        }
    }

    fn mounted() -> ViewportController {
        let mut controller = ViewportController::new(today(), &ChartSettings::default()).unwrap();
        controller.mount();
        controller.take_events();
        controller
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("Dev", "API", "Aki", ymd(2025, 6, 1), ymd(2025, 6, 20)),
            Task::new("Ops", "Deploy", "Ben", ymd(2025, 6, 21), ymd(2025, 6, 25)),
        ]
    }

    #[test]
    fn construction_emits_the_initial_range_and_validates_settings() {
        let mut controller = ViewportController::new(today(), &ChartSettings::default()).unwrap();
        assert_eq!(
            controller.take_events(),
            vec![ChartEvent::RangeChanged {
                start: ymd(2024, 12, 15),
                end: ymd(2026, 6, 15),
            }]
        );

        let bad = ChartSettings {
            column_width: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            ViewportController::new(today(), &bad),
            Err(ConfigError::ColumnWidth(_))
        ));
    }

    #[test]
    fn frames_before_mount_do_nothing() {
        let mut controller = ViewportController::new(today(), &ChartSettings::default()).unwrap();
        let mut surface = surface_for(&controller);
        let report = controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert_eq!(report, FrameReport::default());
        assert_eq!(controller.dims().sticky_width(), 0.0);
        assert!(!controller.is_ready());
    }

    #[test]
    fn first_frame_centres_today_once() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        let now = Instant::now();

        controller.frame(now, &mut surface, &probe(), true, 0);
        assert!(controller.is_ready());
        assert_eq!(controller.dims().sticky_width(), STICKY);
        // today is index 182: 182 * 36 + 18 - 360
        assert_eq!(surface.left, 6210.0);

        surface.left = 100.0;
        controller.frame(now, &mut surface, &probe(), true, 0);
        assert_eq!(surface.left, 100.0);
    }

    #[test]
    fn centring_waits_for_a_scroll_range() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        let full_content = surface.content.0;
        surface.content.0 = surface.client.0;

        // Busy frames, so the left-edge extension stays queued.
        controller.frame(Instant::now(), &mut surface, &probe(), false, 0);
        assert!(!controller.is_ready());
        assert_eq!(surface.left, 0.0);

        surface.content.0 = full_content;
        controller.frame(Instant::now(), &mut surface, &probe(), false, 0);
        assert!(controller.is_ready());
        assert_eq!(surface.left, 6210.0);
    }

    #[test]
    fn layout_is_measured_once_the_probe_is_mounted() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);

        let report = controller.frame(Instant::now(), &mut surface, &FakeProbe::default(), true, 0);
        assert_eq!(controller.dims().sticky_width(), 0.0);
        assert_eq!(report.repaint_after, Some(Duration::ZERO));

        // No resize in between: the pending measurement is still owed.
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert_eq!(controller.dims().sticky_width(), STICKY);
        assert_eq!(controller.dims().header_height(), HEADER);
    }

    #[test]
    fn next_frame_idle_mode_maintains_without_idle_frames() {
        let settings = ChartSettings {
            idle_mode: IdleMode::NextFrame,
            ..Default::default()
        };
        let mut controller = ViewportController::new(today(), &settings).unwrap();
        controller.mount();
        let mut surface = surface_for(&controller);
        let t0 = Instant::now();
        controller.frame(t0, &mut surface, &probe(), false, 0);
        let start = controller.window().range_start();

        surface.left = 30.0 * 36.0;
        controller.on_scroll(t0);
        let report = controller.frame(t0, &mut surface, &probe(), false, 0);
        assert_eq!(report.maintenance.extended_left, 90);
        assert_eq!(controller.window().range_start(), add_days(start, -90).unwrap());
    }

    #[test]
    fn memos_stay_on_their_day_when_the_left_edge_moves() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        let t0 = Instant::now();
        controller.frame(t0, &mut surface, &probe(), true, 0);
        controller.take_events();

        let day_under = |controller: &ViewportController, memo: &Memo| {
            let idx = ((memo.x - STICKY) / 36.0).floor() as usize;
            controller.window().day(idx)
        };
        let idx = controller.window().index_of(ymd(2025, 1, 10)).unwrap();
        let memo = Memo::new_at(STICKY + idx as f32 * 36.0 + 4.0, 120.0);
        controller.set_memos(vec![memo.clone()]);
        assert_eq!(day_under(&controller, &memo), Some(ymd(2025, 1, 10)));

        // 30 days of left slack.
        surface.left = 30.0 * 36.0;
        controller.on_scroll(t0);
        let report = controller.frame(t0, &mut surface, &probe(), true, 0);
        assert_eq!(report.maintenance.extended_left, 90);

        let moved = controller.memos()[0].clone();
        assert_eq!(moved.x, memo.x + 90.0 * 36.0);
        assert_eq!(moved.y, memo.y);
        assert_eq!(day_under(&controller, &moved), Some(ymd(2025, 1, 10)));
        assert_eq!(
            controller.take_events(),
            vec![
                ChartEvent::MemoChanged(moved),
                ChartEvent::RangeChanged {
                    start: controller.window().range_start(),
                    end: controller.window().range_end(),
                },
            ]
        );
    }

    #[test]
    fn memo_edits_and_deletes_update_the_drawn_memos() {
        let mut controller = mounted();
        let memo = Memo::new_at(500.0, 100.0);
        controller.edit_memo(memo.clone());
        assert_eq!(controller.memos(), &[memo.clone()]);

        let edited = Memo {
            text: "call vendor".into(),
            ..memo.clone()
        };
        controller.edit_memo(edited.clone());
        assert_eq!(controller.memos(), &[edited.clone()]);

        controller.delete_memo(&memo.id);
        assert!(controller.memos().is_empty());
        assert_eq!(
            controller.take_events(),
            vec![
                ChartEvent::MemoChanged(memo.clone()),
                ChartEvent::MemoChanged(edited),
                ChartEvent::MemoDeleted(memo.id),
            ]
        );
    }

    #[test]
    fn new_memos_go_to_the_focused_cell() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.set_tasks(tasks());
        controller.frame(Instant::now(), &mut surface, &probe(), true, 2);

        assert_eq!(controller.new_memo_position(), controller.today_column_position());

        let col = controller.window().index_of(ymd(2025, 6, 10)).unwrap();
        controller.focus_cell(1, col);
        assert_eq!(
            controller.new_memo_position(),
            Some((STICKY + col as f32 * 36.0, HEADER + 25.0))
        );

        controller.focus_cell(7, col);
        assert_eq!(controller.new_memo_position(), controller.today_column_position());
    }

    #[test]
    fn shift_wheel_scrolls_horizontally() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        let now = Instant::now();
        let horizontal = WheelInput {
            delta_x: 0.0,
            delta_y: 120.0,
            shift: true,
        };

        assert!(controller.on_wheel(now, horizontal, &mut surface));
        assert_eq!(surface.left, 120.0);
        assert!(!controller.on_wheel(
            now,
            WheelInput {
                shift: false,
                ..horizontal
            },
            &mut surface
        ));
        assert!(!controller.on_wheel(
            now,
            WheelInput {
                delta_x: 200.0,
                ..horizontal
            },
            &mut surface
        ));

        controller.teardown();
        assert!(!controller.on_wheel(now, horizontal, &mut surface));
        assert_eq!(surface.left, 120.0);
    }

    #[test]
    fn scrolling_near_the_end_extends_and_reports_the_range() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        let t0 = Instant::now();
        controller.frame(t0, &mut surface, &probe(), true, 0);
        controller.take_events();
        let end = controller.window().range_end();

        // 30 days of right slack.
        let covered = controller.window().len() - 30;
        surface.left = covered as f32 * 36.0 - 720.0;
        controller.on_scroll(t0);
        let report = controller.frame(t0, &mut surface, &probe(), true, 0);

        assert_eq!(report.maintenance.extended_right, 90);
        assert_eq!(controller.window().range_end(), add_days(end, 90).unwrap());
        assert_eq!(
            controller.take_events(),
            vec![ChartEvent::RangeChanged {
                start: controller.window().range_start(),
                end: add_days(end, 90).unwrap(),
            }]
        );
    }

    #[test]
    fn bars_wait_for_rendered_rows() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.set_tasks(tasks());

        let deferred = controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert!(!deferred.bars_rebuilt);
        assert_eq!(deferred.repaint_after, Some(Duration::ZERO));
        assert!(controller.bars().is_empty());

        let built = controller.frame(Instant::now(), &mut surface, &probe(), true, 2);
        assert!(built.bars_rebuilt);
        assert_eq!(controller.bars().planned.len(), 2);
        assert_eq!(controller.bars().planned[1].top, HEADER + 25.0 + 7.0);
    }

    #[test]
    fn filtering_hides_rows_and_rebuilds_bars() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.set_tasks(tasks());
        controller.frame(Instant::now(), &mut surface, &probe(), true, 2);

        controller.toggle_filter_popup(FilterColumn::Assignee);
        assert_eq!(controller.filter_popup(), Some(FilterColumn::Assignee));
        controller.set_filter_selected(FilterColumn::Assignee, "Aki", false);
        controller.toggle_filter_popup(FilterColumn::Assignee);
        assert_eq!(controller.filter_popup(), None);

        assert_eq!(controller.views().len(), 1);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 1);
        assert_eq!(controller.bars().planned.len(), 1);
        assert_eq!(controller.bars().planned[0].row, 0);
    }

    #[test]
    fn memo_drag_is_clamped_and_emitted_on_release() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        let memo = Memo::new_at(500.0, 100.0);

        assert!(controller.begin_memo_drag(&memo, (510.0, 110.0)));
        assert!(!controller.begin_memo_resize(&memo, (0.0, 0.0)));
        assert!(controller.listeners().is_active(Listener::PointerMove));

        controller.pointer_moved((20.0, 5.0), &surface);
        let live = controller.active_memo().unwrap();
        assert_eq!((live.x, live.y), (STICKY, HEADER));

        controller.pointer_moved((1.0e7, 1.0e7), &surface);
        let live = controller.active_memo().unwrap();
        assert_eq!(live.x, surface.content.0 - memo.width);
        assert_eq!(live.y, surface.content.1 - memo.height);

        let released = controller.pointer_released().unwrap();
        assert!(!controller.listeners().is_active(Listener::PointerMove));
        assert!(!controller.listeners().is_active(Listener::PointerUp));
        assert_eq!(controller.take_events(), vec![ChartEvent::MemoChanged(released)]);
    }

    #[test]
    fn memo_resize_keeps_the_minimum_width() {
        let mut controller = mounted();
        let memo = Memo::new_at(500.0, 100.0);
        let surface = surface_for(&controller);

        controller.begin_memo_resize(&memo, (690.0, 220.0));
        controller.pointer_moved((600.0, 300.0), &surface);
        let live = controller.active_memo().unwrap();
        assert_eq!(live.width, MIN_MEMO_WIDTH);
        assert_eq!(live.height, 200.0);

        controller.pointer_moved((790.0, 100.0), &surface);
        let released = controller.pointer_released().unwrap();
        assert_eq!(released.width, 290.0);
        assert_eq!(released.height, MIN_MEMO_HEIGHT);
    }

    #[test]
    fn teardown_mid_drag_releases_everything_without_emitting() {
        let mut controller = mounted();
        let memo = Memo::new_at(500.0, 100.0);
        controller.begin_memo_drag(&memo, (510.0, 110.0));

        controller.teardown();
        assert!(controller.listeners().is_empty());
        assert!(controller.active_memo().is_none());
        assert_eq!(controller.pointer_released(), None);
        assert_eq!(controller.take_events(), vec![]);
    }

    #[test]
    fn only_positive_progress_is_committed() {
        let mut controller = mounted();
        controller.set_tasks(tasks());
        let col = controller.window().index_of(ymd(2025, 6, 10)).unwrap();
        let task_id = controller.views()[0].task.id.clone();

        for rejected in ["", "abc", "0", "-5", "NaN"] {
            assert!(controller.begin_progress_edit(0, col));
            assert_eq!(controller.commit_progress(rejected), None);
            assert!(controller.progress_edit().is_none());
        }
        assert_eq!(controller.take_events(), vec![]);

        assert!(controller.begin_progress_edit(0, col));
        let intent = controller.commit_progress(" 12.5 ").unwrap();
        assert_eq!(
            intent,
            ProgressIntent {
                task_id,
                added_value: 12.5,
                date: ymd(2025, 6, 10),
            }
        );
        assert_eq!(controller.take_events(), vec![ChartEvent::ProgressInput(intent)]);
        assert!(!controller.begin_progress_edit(5, col));
    }

    #[test]
    fn move_span_rebuilds_and_scrolls_to_the_start() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);

        controller.move_span(1);
        assert_eq!(controller.window().range_start(), ymd(2026, 6, 15));
        assert_eq!(
            controller.take_events(),
            vec![ChartEvent::RangeChanged {
                start: ymd(2026, 6, 15),
                end: ymd(2027, 12, 15),
            }]
        );
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        // Scrolled to the start, which then grew to the left without moving.
        let anchor = ScrollAnchor::capture(surface.left, 36.0, controller.window().keys()).unwrap();
        assert_eq!(anchor.date_key, "2026-06-15");
        assert_eq!(controller.window().range_start(), ymd(2026, 3, 17));

        controller.move_span(-1);
        assert_eq!(controller.window().range_start(), ymd(2024, 12, 15));
        assert_eq!(controller.span_offset(), 0);
    }

    #[test]
    fn vertical_paging_moves_by_most_of_a_page() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);

        controller.scroll_vertical_by_page(1);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert_eq!(surface.top, (400.0 - HEADER) * 0.9);

        controller.scroll_vertical_by_page(-1);
        controller.scroll_vertical_by_page(-1);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert_eq!(surface.top, 0.0);
    }

    #[test]
    fn row_clicks_and_memo_deletes_become_events() {
        let mut controller = mounted();
        controller.set_tasks(tasks());
        let id = controller.views()[1].task.id.clone();

        controller.row_clicked(1);
        controller.row_clicked(9);
        controller.delete_memo("m1");
        assert_eq!(
            controller.take_events(),
            vec![
                ChartEvent::TaskClicked(id),
                ChartEvent::MemoDeleted("m1".into()),
            ]
        );
    }

    #[test]
    fn today_column_position_uses_cached_dimensions() {
        let mut controller = mounted();
        let mut surface = surface_for(&controller);
        controller.frame(Instant::now(), &mut surface, &probe(), true, 0);
        assert_eq!(
            controller.today_column_position(),
            Some((STICKY + 182.0 * 36.0, HEADER))
        );
    }
}
