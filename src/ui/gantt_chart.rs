use std::time::Instant;

use chrono::Datelike;
use egui::{
    Align2, Color32, Event, FontId, Id, Key, Modifiers, MouseWheelUnit, Pos2, Rect, Rounding,
    Sense, Stroke, Ui, Vec2,
};

use crate::chart::{
    FilterColumn, Lane, LayoutProbe, OverlayBar, ScrollSurface, ViewportController, WheelInput,
};
use crate::model::Memo;
use crate::ui::filter_popup;
use crate::ui::theme;

/// Pixels per wheel "line", the usual browser value.
const WHEEL_LINE_PX: f32 = 40.0;

/// The egui scroll area seen through the chart's `ScrollSurface` seam.
///
/// Offsets written by the controller are held here and pushed into the
/// scroll area on the next show; the area clamps them to its content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EguiSurface {
    offset: Vec2,
    client: Vec2,
    content: Vec2,
    dirty: bool,
}

impl EguiSurface {
    /// Take the offset to force onto the scroll area, if the controller
    /// moved it since the last show.
    fn take_forced_offset(&mut self) -> Option<Vec2> {
        std::mem::take(&mut self.dirty).then_some(self.offset)
    }
}

impl ScrollSurface for EguiSurface {
    fn scroll_left(&self) -> f32 {
        self.offset.x
    }
    fn set_scroll_left(&mut self, px: f32) {
        self.offset.x = px.max(0.0);
        self.dirty = true;
    }
    fn scroll_top(&self) -> f32 {
        self.offset.y
    }
    fn set_scroll_top(&mut self, px: f32) {
        self.offset.y = px.max(0.0);
        self.dirty = true;
    }
    fn client_width(&self) -> f32 {
        self.client.x
    }
    fn client_height(&self) -> f32 {
        self.client.y
    }
    fn scroll_width(&self) -> f32 {
        self.content.x
    }
    fn scroll_height(&self) -> f32 {
        self.content.y
    }
}

/// What the last paint laid out. Measurements only exist once the chart
/// has been shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintedLayout {
    painted: bool,
    rows: Vec<(f32, f32)>,
}

impl PaintedLayout {
    fn record(&mut self, row_count: usize) {
        let header = theme::header_height();
        let step = theme::ROW_HEIGHT + theme::ROW_BORDER;
        self.painted = true;
        self.rows = (0..row_count.min(2))
            .map(|row| (header + row as f32 * step, theme::ROW_HEIGHT))
            .collect();
    }
}

impl LayoutProbe for PaintedLayout {
    fn sticky_column_widths(&self) -> Option<Vec<f32>> {
        self.painted.then(|| theme::STICKY_COLUMN_WIDTHS.to_vec())
    }
    fn header_height(&self) -> Option<f32> {
        self.painted.then(theme::header_height)
    }
    fn row_rects(&self) -> Vec<(f32, f32)> {
        self.rows.clone()
    }
}

/// Per-view state that lives across frames.
#[derive(Debug, Default)]
pub struct ChartViewState {
    surface: EguiSurface,
    layout: PaintedLayout,
    rendered_rows: usize,
    progress_text: String,
    editor_open: bool,
}

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// A memo was double-clicked and should open in the editor.
    pub edit_memo: Option<Memo>,
}

/// Output of one paint pass, consumed after the scroll area closes.
#[derive(Default)]
struct Painted {
    rendered_rows: usize,
    progress_cell: Option<Rect>,
    filter_anchor: Option<Pos2>,
    edit_memo: Option<Memo>,
}

/// Screen/content mapping for one paint pass.
#[derive(Clone, Copy)]
struct Canvas {
    /// Screen position of content (0, 0).
    origin: Pos2,
    /// Visible part of the scroll area, in screen space.
    view: Rect,
    sticky: f32,
    header: f32,
    column: f32,
    step: f32,
    content: Vec2,
}

impl Canvas {
    fn body_clip(&self) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.view.left() + self.sticky, self.view.top() + self.header),
            self.view.max,
        )
    }

    fn column_x(&self, idx: usize) -> f32 {
        self.origin.x + self.sticky + idx as f32 * self.column
    }

    fn row_y(&self, row: usize) -> f32 {
        self.origin.y + self.header + row as f32 * self.step
    }

    fn to_content(&self, pos: Pos2) -> (f32, f32) {
        (pos.x - self.origin.x, pos.y - self.origin.y)
    }

    /// Body row under a screen position, ignoring the pinned header.
    fn row_at(&self, pos: Pos2) -> Option<usize> {
        if pos.y < self.view.top() + self.header {
            return None;
        }
        let y = pos.y - self.origin.y - self.header;
        (y >= 0.0).then(|| (y / self.step).floor() as usize)
    }

    /// Date column under a screen position, ignoring the pinned columns.
    fn column_at(&self, pos: Pos2) -> Option<usize> {
        if pos.x < self.view.left() + self.sticky {
            return None;
        }
        let x = pos.x - self.origin.x - self.sticky;
        (x >= 0.0).then(|| (x / self.column).floor() as usize)
    }
}

/// Render the chart: pinned task columns, two-row date header, day grid,
/// overlay bars and memos, all inside one scroll area.
pub fn show_gantt_chart(
    controller: &mut ViewportController,
    state: &mut ChartViewState,
    ui: &mut Ui,
) -> ChartInteraction {
    let now = Instant::now();
    let mut interaction = ChartInteraction::default();

    let host_idle = ui.input(|i| {
        !i.pointer.any_down()
            && i.smooth_scroll_delta == Vec2::ZERO
            && i.raw_scroll_delta == Vec2::ZERO
    });

    // Shift + vertical wheel pans the dates instead of the rows.
    if ui.rect_contains_pointer(ui.max_rect()) {
        let page = state.surface.client.y.max(1.0);
        let wheel: Vec<WheelInput> = ui.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    Event::MouseWheel {
                        unit,
                        delta,
                        modifiers,
                    } => Some(wheel_input(*unit, *delta, *modifiers, page)),
                    _ => None,
                })
                .collect()
        });
        let mut consumed = false;
        for input in wheel {
            consumed |= controller.on_wheel(now, input, &mut state.surface);
        }
        if consumed {
            ui.ctx().input_mut(|i| {
                i.smooth_scroll_delta = Vec2::ZERO;
                i.raw_scroll_delta = Vec2::ZERO;
            });
        }
    }

    state.surface.content = Vec2::new(controller.content_width(), controller.content_height());
    let report = controller.frame(
        now,
        &mut state.surface,
        &state.layout,
        host_idle,
        state.rendered_rows,
    );
    if let Some(after) = report.repaint_after {
        ui.ctx().request_repaint_after(after);
    }

    let content_size = Vec2::new(controller.content_width(), controller.content_height());
    let mut area = egui::ScrollArea::both()
        .id_salt("gantt-scroll")
        .auto_shrink([false, false])
        .drag_to_scroll(false);
    if let Some(offset) = state.surface.take_forced_offset() {
        area = area.scroll_offset(offset);
    }

    let output = area.show_viewport(ui, |ui, _viewport| {
        paint_chart(controller, ui, content_size)
    });
    let painted = output.inner;

    if output.state.offset != state.surface.offset {
        state.surface.offset = output.state.offset;
        controller.on_scroll(now);
    }
    let client = output.inner_rect.size();
    if client != state.surface.client {
        state.surface.client = client;
        controller.on_resize();
    }
    state.layout.record(controller.views().len());
    state.rendered_rows = painted.rendered_rows;
    interaction.edit_memo = painted.edit_memo;

    show_progress_editor(controller, state, painted.progress_cell, ui);

    if let (Some(column), Some(anchor)) = (controller.filter_popup(), painted.filter_anchor) {
        filter_popup::show_filter_popup(ui.ctx(), controller, column, anchor);
    }

    interaction
}

/// Browser-style wheel delta: positive `delta_y` scrolls down.
fn wheel_input(unit: MouseWheelUnit, delta: Vec2, modifiers: Modifiers, page: f32) -> WheelInput {
    let scale = match unit {
        MouseWheelUnit::Point => 1.0,
        MouseWheelUnit::Line => WHEEL_LINE_PX,
        MouseWheelUnit::Page => page,
    };
    WheelInput {
        delta_x: -delta.x * scale,
        delta_y: -delta.y * scale,
        shift: modifiers.shift,
    }
}

fn paint_chart(
    controller: &mut ViewportController,
    ui: &mut Ui,
    content_size: Vec2,
) -> Painted {
    let origin = ui.max_rect().min;
    let view = ui.clip_rect();
    let dims = *controller.dims();
    let frame = Canvas {
        origin,
        view,
        sticky: dims.sticky_width(),
        header: dims.header_height(),
        column: controller.column_width(),
        step: dims.row_step(),
        content: content_size,
    };
    let mut painted = Painted::default();

    let body = ui.allocate_rect(Rect::from_min_size(origin, content_size), Sense::click());
    ui.painter().rect_filled(view, 0.0, theme::BG_DARK);

    let day_count = controller.window().len();
    let row_count = controller.views().len();
    let scroll = view.min - origin;
    let visible_width = (view.width() - frame.sticky).max(0.0);
    let first_col = ((scroll.x / frame.column).floor().max(0.0) as usize).min(day_count);
    let last_col = (((scroll.x + visible_width) / frame.column).ceil() as usize + 1).min(day_count);
    let visible_height = (view.height() - frame.header).max(0.0);
    let first_row = ((scroll.y / frame.step).floor().max(0.0) as usize).min(row_count);
    let last_row = (((scroll.y + visible_height) / frame.step).ceil() as usize + 1).min(row_count);
    painted.rendered_rows = last_row - first_row;

    let hover_row = ui
        .input(|i| i.pointer.hover_pos())
        .filter(|pos| view.contains(*pos))
        .and_then(|pos| frame.row_at(pos))
        .filter(|row| *row < row_count);

    draw_body(ui, controller, &frame, (first_col, last_col), (first_row, last_row), hover_row);
    painted.edit_memo = draw_memos(ui, controller, &frame);
    draw_sticky_columns(ui, controller, &frame, (first_row, last_row), hover_row);
    draw_header(ui, controller, &frame, (first_col, last_col));
    painted.filter_anchor = draw_corner(ui, controller, &frame);

    if let Some(pos) = body.interact_pointer_pos() {
        let row = frame.row_at(pos).filter(|row| *row < row_count);
        let cell = row.zip(frame.column_at(pos));
        if let (true, Some((row, col))) = (body.is_pointer_button_down_on(), cell) {
            controller.focus_cell(row, col);
        }
        if body.double_clicked() {
            if let Some((row, col)) = cell {
                controller.begin_progress_edit(row, col);
            }
        } else if body.clicked() {
            controller.close_filter_popup();
            if let Some(row) = row {
                controller.row_clicked(row);
            }
        }
    }

    if let Some(edit) = controller.progress_edit() {
        let row = controller
            .views()
            .iter()
            .position(|view| view.task.id == edit.task_id);
        let col = controller.window().index_of(edit.date);
        painted.progress_cell = row.zip(col).map(|(row, col)| {
            Rect::from_min_size(
                Pos2::new(frame.column_x(col), frame.row_y(row)),
                Vec2::new(frame.column, theme::ROW_HEIGHT),
            )
        });
    }

    painted
}

fn draw_body(
    ui: &Ui,
    controller: &ViewportController,
    frame: &Canvas,
    (first_col, last_col): (usize, usize),
    (first_row, last_row): (usize, usize),
    hover_row: Option<usize>,
) {
    let clip = frame.body_clip();
    let painter = ui.painter_at(clip);
    let window = controller.window();
    let today = controller.today();

    for row in first_row..last_row {
        let y = frame.row_y(row);
        let rect = Rect::from_min_max(
            Pos2::new(clip.left(), y),
            Pos2::new(clip.right(), y + theme::ROW_HEIGHT),
        );
        if hover_row == Some(row) {
            painter.rect_filled(rect, 0.0, theme::BG_ROW_HOVER);
        } else if row % 2 == 1 {
            painter.rect_filled(rect, 0.0, theme::BG_ROW_ODD);
        }
        painter.line_segment(
            [
                Pos2::new(clip.left(), y + frame.step - 0.5),
                Pos2::new(clip.right(), y + frame.step - 0.5),
            ],
            Stroke::new(theme::ROW_BORDER, theme::BORDER_SUBTLE),
        );
    }

    let bottom = frame.row_y(last_row).min(clip.bottom());
    for idx in first_col..last_col {
        let x = frame.column_x(idx);
        let column = Rect::from_min_max(
            Pos2::new(x, clip.top()),
            Pos2::new(x + frame.column, bottom),
        );
        if window.is_today(idx, today) {
            painter.rect_filled(column, 0.0, theme::TODAY_SHADE);
        } else if window.is_weekend(idx) {
            painter.rect_filled(column, 0.0, theme::WEEKEND_SHADE);
        }
        painter.line_segment(
            [Pos2::new(x, clip.top()), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }

    let bars = controller.bars();
    let visible = |bar: &OverlayBar| {
        (first_row..last_row).contains(&bar.row) && bar.end_idx >= first_col && bar.start_idx < last_col
    };
    for bar in bars.planned.iter().filter(|bar| visible(bar)) {
        let rect = bar_rect(frame, bar);
        painter.rect_filled(rect, Rounding::same(theme::BAR_ROUNDING), theme::BAR_PLANNED);
        painter.rect_stroke(
            rect,
            Rounding::same(theme::BAR_ROUNDING),
            Stroke::new(1.0, theme::BAR_PLANNED_EDGE),
        );
    }
    for bar in bars.actual.iter().filter(|bar| visible(bar)) {
        let color = if bar.is_out_of_plan {
            theme::BAR_OUT_OF_PLAN
        } else {
            theme::BAR_ACTUAL
        };
        let rect = bar_rect(frame, bar);
        // Lowered bars sit under the planned run; keep a hairline between them.
        let rect = if bar.lane == Lane::Lowered {
            rect.shrink2(Vec2::new(0.0, 0.5))
        } else {
            rect
        };
        painter.rect_filled(rect, Rounding::same(theme::BAR_ROUNDING), color);
    }

    if let Some(idx) = window.index_of(today) {
        let x = frame.column_x(idx) + frame.column / 2.0;
        painter.line_segment(
            [Pos2::new(x, clip.top()), Pos2::new(x, bottom)],
            Stroke::new(1.5, theme::TODAY_LINE),
        );
    }
}

fn bar_rect(frame: &Canvas, bar: &OverlayBar) -> Rect {
    Rect::from_min_size(
        frame.origin + Vec2::new(bar.left, bar.top),
        Vec2::new(bar.width, bar.height),
    )
}

/// Paint memos and start drag/resize gestures on them. Returns a memo the
/// user double-clicked.
fn draw_memos(ui: &Ui, controller: &mut ViewportController, frame: &Canvas) -> Option<Memo> {
    let clip = frame.body_clip();
    let painter = ui.painter_at(clip);
    let mut edit = None;

    for stored in controller.memos().to_vec() {
        let memo = controller
            .active_memo()
            .filter(|live| live.id == stored.id)
            .cloned()
            .unwrap_or_else(|| stored.clone());
        let rect = Rect::from_min_size(
            frame.origin + Vec2::new(memo.x, memo.y),
            Vec2::new(memo.width, memo.height),
        );
        if !rect.intersects(clip) {
            continue;
        }

        painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), Rounding::same(4.0), Color32::from_black_alpha(60));
        painter.rect_filled(rect, Rounding::same(4.0), theme::MEMO_BG);
        painter.rect_stroke(rect, Rounding::same(4.0), Stroke::new(1.0, theme::MEMO_BORDER));
        let galley = painter.layout(
            memo.text.clone(),
            theme::font_cell(),
            theme::MEMO_TEXT,
            (memo.width - 28.0).max(10.0),
        );
        painter
            .with_clip_rect(rect.shrink(4.0).intersect(clip))
            .galley(rect.min + Vec2::new(6.0, 6.0), galley, theme::MEMO_TEXT);

        let grip = ui.interact(
            rect.intersect(clip),
            ui.id().with(("memo", &memo.id)),
            Sense::click_and_drag(),
        );
        if grip.double_clicked() {
            edit = Some(memo.clone());
        } else if grip.drag_started() {
            if let Some(pos) = grip.interact_pointer_pos() {
                controller.begin_memo_drag(&memo, frame.to_content(pos));
            }
        }
        if grip.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        let handle_rect = Rect::from_min_max(rect.max - Vec2::splat(theme::MEMO_HANDLE), rect.max);
        painter.line_segment(
            [
                Pos2::new(handle_rect.left() + 3.0, handle_rect.bottom() - 2.0),
                Pos2::new(handle_rect.right() - 2.0, handle_rect.top() + 3.0),
            ],
            Stroke::new(1.0, theme::MEMO_BORDER),
        );
        let handle = ui.interact(
            handle_rect.intersect(clip),
            ui.id().with(("memo-resize", &memo.id)),
            Sense::drag(),
        );
        if handle.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeNwSe);
        }
        if handle.drag_started() {
            if let Some(pos) = handle.interact_pointer_pos() {
                controller.begin_memo_resize(&memo, frame.to_content(pos));
            }
        }

        let close_rect = Rect::from_min_size(
            Pos2::new(rect.right() - 18.0, rect.top() + 2.0),
            Vec2::splat(16.0),
        );
        let close = ui.interact(
            close_rect.intersect(clip),
            ui.id().with(("memo-delete", &memo.id)),
            Sense::click(),
        );
        painter.text(
            close_rect.center(),
            Align2::CENTER_CENTER,
            egui_phosphor::regular::X,
            FontId::proportional(12.0),
            if close.hovered() {
                theme::TODAY_LINE
            } else {
                theme::MEMO_TEXT
            },
        );
        if close.clicked() {
            controller.delete_memo(&memo.id);
        }
    }

    if controller.active_memo().is_some() {
        let (latest, released) =
            ui.input(|i| (i.pointer.latest_pos(), i.pointer.any_released()));
        if let Some(pos) = latest {
            let surface = CanvasSurface::from(frame);
            controller.pointer_moved(frame.to_content(pos), &surface);
        }
        if released {
            controller.pointer_released();
        }
    }
    edit
}

/// Read-only surface built from what is on screen, for clamping gestures.
struct CanvasSurface {
    left: f32,
    top: f32,
    client: Vec2,
    content: Vec2,
}

impl From<&Canvas> for CanvasSurface {
    fn from(frame: &Canvas) -> Self {
        Self {
            left: frame.view.left() - frame.origin.x,
            top: frame.view.top() - frame.origin.y,
            client: frame.view.size(),
            content: frame.content,
        }
    }
}

impl ScrollSurface for CanvasSurface {
    fn scroll_left(&self) -> f32 {
        self.left
    }
    fn set_scroll_left(&mut self, _px: f32) {}
    fn scroll_top(&self) -> f32 {
        self.top
    }
    fn set_scroll_top(&mut self, _px: f32) {}
    fn client_width(&self) -> f32 {
        self.client.x
    }
    fn client_height(&self) -> f32 {
        self.client.y
    }
    fn scroll_width(&self) -> f32 {
        self.content.x
    }
    fn scroll_height(&self) -> f32 {
        self.content.y
    }
}

fn draw_sticky_columns(
    ui: &Ui,
    controller: &ViewportController,
    frame: &Canvas,
    (first_row, last_row): (usize, usize),
    hover_row: Option<usize>,
) {
    let area = Rect::from_min_max(
        Pos2::new(frame.view.left(), frame.view.top() + frame.header),
        Pos2::new(frame.view.left() + frame.sticky, frame.view.bottom()),
    );
    let painter = ui.painter_at(area);
    painter.rect_filled(area, 0.0, theme::BG_PANEL);

    for row in first_row..last_row {
        let Some(view) = controller.views().get(row) else {
            break;
        };
        let y = frame.row_y(row);
        if hover_row == Some(row) {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(area.left(), y), Vec2::new(frame.sticky, theme::ROW_HEIGHT)),
                0.0,
                theme::BG_ROW_HOVER,
            );
        }
        let mut x = area.left();
        for (column, width) in FilterColumn::ALL.iter().zip(theme::STICKY_COLUMN_WIDTHS) {
            let cell = Rect::from_min_size(Pos2::new(x, y), Vec2::new(width, theme::ROW_HEIGHT));
            let color = match column {
                FilterColumn::Name => theme::TEXT_PRIMARY,
                _ => theme::TEXT_SECONDARY,
            };
            painter.with_clip_rect(cell.shrink2(Vec2::new(4.0, 0.0)).intersect(area)).text(
                Pos2::new(cell.left() + 6.0, cell.center().y),
                Align2::LEFT_CENTER,
                column.value_of(&view.task),
                theme::font_cell(),
                color,
            );
            x += width;
        }
        painter.line_segment(
            [
                Pos2::new(area.left(), y + frame.step - 0.5),
                Pos2::new(area.right(), y + frame.step - 0.5),
            ],
            Stroke::new(theme::ROW_BORDER, theme::BORDER_SUBTLE),
        );
    }

    painter.line_segment(
        [
            Pos2::new(area.right() - 0.5, area.top()),
            Pos2::new(area.right() - 0.5, area.bottom()),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let detail = hover_row
        .and_then(|row| controller.views().get(row))
        .map(|view| view.task.detail.as_str())
        .filter(|detail| !detail.is_empty());
    if let Some(detail) = detail {
        ui.interact(area, ui.id().with("task-detail"), Sense::hover())
            .on_hover_text(detail);
    }
}

fn draw_header(
    ui: &Ui,
    controller: &ViewportController,
    frame: &Canvas,
    (first_col, last_col): (usize, usize),
) {
    let area = Rect::from_min_max(
        Pos2::new(frame.view.left() + frame.sticky, frame.view.top()),
        Pos2::new(frame.view.right(), frame.view.top() + frame.header),
    );
    let painter = ui.painter_at(area);
    painter.rect_filled(area, 0.0, theme::BG_HEADER);

    let window = controller.window();
    let today = controller.today();
    let month_bottom = area.top() + theme::MONTH_ROW_HEIGHT;

    let mut start = 0usize;
    for group in window.months() {
        let end = start + group.days;
        if end > first_col && start < last_col {
            let rect = Rect::from_min_max(
                Pos2::new(frame.column_x(start), area.top()),
                Pos2::new(frame.column_x(end), month_bottom),
            );
            painter.rect_filled(rect, 0.0, theme::month_color(group.month));
            painter.line_segment(
                [rect.left_top(), rect.left_bottom()],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );
            // Keep the label readable while its month is partly scrolled off.
            let label_x = (rect.left() + 6.0).max(area.left() + 6.0).min(rect.right() - 60.0);
            painter.text(
                Pos2::new(label_x, rect.center().y),
                Align2::LEFT_CENTER,
                &group.label,
                theme::font_header(),
                theme::TEXT_ON_MONTH,
            );
        }
        start = end;
    }

    for idx in first_col..last_col {
        let Some(day) = window.day(idx) else {
            break;
        };
        let cell = Rect::from_min_max(
            Pos2::new(frame.column_x(idx), month_bottom),
            Pos2::new(frame.column_x(idx + 1), area.bottom()),
        );
        let color = if window.is_today(idx, today) {
            painter.rect_filled(cell.shrink(2.0), Rounding::same(3.0), theme::TODAY_LINE);
            Color32::WHITE
        } else if window.is_weekend(idx) {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        painter.text(
            cell.center(),
            Align2::CENTER_CENTER,
            day.day().to_string(),
            theme::font_sub(),
            color,
        );
    }

    painter.line_segment(
        [
            Pos2::new(area.left(), area.bottom() - 0.5),
            Pos2::new(area.right(), area.bottom() - 0.5),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

/// Pinned corner with the column titles and their filter buttons. Returns
/// where the open filter popup should hang.
fn draw_corner(ui: &Ui, controller: &mut ViewportController, frame: &Canvas) -> Option<Pos2> {
    let area = Rect::from_min_size(frame.view.min, Vec2::new(frame.sticky, frame.header));
    let painter = ui.painter_at(area);
    painter.rect_filled(area, 0.0, theme::BG_HEADER);

    let mut anchor = None;
    let mut x = area.left();
    for (column, width) in FilterColumn::ALL.into_iter().zip(theme::STICKY_COLUMN_WIDTHS) {
        let cell = Rect::from_min_size(Pos2::new(x, area.top()), Vec2::new(width, frame.header));
        painter.text(
            Pos2::new(cell.left() + 6.0, cell.center().y),
            Align2::LEFT_CENTER,
            column.label(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );

        let icon_rect = Rect::from_center_size(
            Pos2::new(cell.right() - 12.0, cell.center().y),
            Vec2::splat(18.0),
        );
        let button = ui.interact(icon_rect, ui.id().with(("filter", column)), Sense::click());
        let color = if controller.filters().is_active(column) {
            theme::FILTER_ACTIVE
        } else if button.hovered() {
            theme::TEXT_PRIMARY
        } else {
            theme::TEXT_DIM
        };
        painter.text(
            icon_rect.center(),
            Align2::CENTER_CENTER,
            egui_phosphor::regular::FUNNEL,
            FontId::proportional(13.0),
            color,
        );
        if button.clicked() {
            controller.toggle_filter_popup(column);
        }
        if controller.filter_popup() == Some(column) {
            anchor = Some(cell.left_bottom());
        }

        painter.line_segment(
            [cell.right_top(), cell.right_bottom()],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        x += width;
    }
    painter.line_segment(
        [
            Pos2::new(area.left(), area.bottom() - 0.5),
            Pos2::new(area.right(), area.bottom() - 0.5),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    anchor
}

/// Inline progress input over the edited cell. Enter or clicking away
/// commits, Escape cancels.
fn show_progress_editor(
    controller: &mut ViewportController,
    state: &mut ChartViewState,
    cell: Option<Rect>,
    ui: &Ui,
) {
    if controller.progress_edit().is_none() {
        state.editor_open = false;
        return;
    }
    let Some(cell) = cell else {
        // The row was filtered away or the day pruned.
        controller.cancel_progress_edit();
        state.editor_open = false;
        return;
    };

    let response = egui::Area::new(Id::new("progress-editor"))
        .order(egui::Order::Foreground)
        .fixed_pos(cell.left_top())
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style())
                .inner_margin(2.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut state.progress_text)
                            .desired_width(cell.width() * 2.0)
                            .hint_text("+%"),
                    )
                })
                .inner
        })
        .inner;

    if !std::mem::replace(&mut state.editor_open, true) {
        state.progress_text.clear();
        response.request_focus();
        return;
    }

    if ui.input(|i| i.key_pressed(Key::Escape)) {
        controller.cancel_progress_edit();
        state.editor_open = false;
    } else if response.lost_focus() {
        let text = std::mem::take(&mut state.progress_text);
        controller.commit_progress(&text);
        state.editor_open = false;
    }
}
