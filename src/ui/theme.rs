use egui::{Color32, FontId, Rounding, Stroke, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_ROW_ODD: Color32 = Color32::from_rgba_premultiplied(6, 6, 6, 6);
pub const BG_ROW_HOVER: Color32 = Color32::from_rgba_premultiplied(14, 14, 14, 14);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(36, 63, 99, 45);
pub const BG_FIELD: Color32 = Color32::from_rgb(20, 20, 28);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_MONTH: Color32 = Color32::from_rgb(40, 44, 56);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const TODAY_SHADE: Color32 = Color32::from_rgba_premultiplied(30, 9, 9, 30);
pub const WEEKEND_SHADE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 40);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const FILTER_ACTIVE: Color32 = Color32::from_rgb(251, 140, 0);

// ── Bars ─────────────────────────────────────────────────────────────────────

pub const BAR_PLANNED: Color32 = Color32::from_rgba_premultiplied(15, 33, 62, 64);
pub const BAR_PLANNED_EDGE: Color32 = Color32::from_rgb(59, 130, 246);
pub const BAR_ACTUAL: Color32 = Color32::from_rgb(59, 130, 246);
pub const BAR_OUT_OF_PLAN: Color32 = Color32::from_rgb(229, 57, 53);
pub const BAR_ROUNDING: f32 = 3.0;

// ── Memos ────────────────────────────────────────────────────────────────────

pub const MEMO_BG: Color32 = Color32::from_rgb(255, 243, 176);
pub const MEMO_TEXT: Color32 = Color32::from_rgb(60, 52, 20);
pub const MEMO_BORDER: Color32 = Color32::from_rgb(214, 190, 90);
pub const MEMO_HANDLE: f32 = 12.0;

// ── Month header bands, January first ────────────────────────────────────────

pub const MONTH_COLORS: [Color32; 12] = [
    Color32::from_rgb(224, 244, 255), // icy blue
    Color32::from_rgb(224, 234, 255), // pale sky
    Color32::from_rgb(255, 230, 240), // blossom pink
    Color32::from_rgb(255, 240, 246), // cherry pink
    Color32::from_rgb(230, 255, 230), // fresh green
    Color32::from_rgb(255, 245, 230), // early summer cream
    Color32::from_rgb(255, 236, 204), // soft orange
    Color32::from_rgb(255, 253, 230), // mellow yellow
    Color32::from_rgb(255, 230, 204), // light ochre
    Color32::from_rgb(249, 242, 230), // gentle beige
    Color32::from_rgb(246, 255, 230), // pale leaf
    Color32::from_rgb(224, 242, 255), // winter blue
];

pub fn month_color(month: u32) -> Color32 {
    MONTH_COLORS[(month.clamp(1, 12) - 1) as usize]
}

// ── Sizes ────────────────────────────────────────────────────────────────────

/// Pinned task columns: type, name, assignee.
pub const STICKY_COLUMN_WIDTHS: [f32; 3] = [90.0, 160.0, 100.0];
pub const MONTH_ROW_HEIGHT: f32 = 22.0;
pub const DAY_ROW_HEIGHT: f32 = 22.0;
pub const ROW_HEIGHT: f32 = 24.0;
/// Bottom border under every body row.
pub const ROW_BORDER: f32 = 1.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

pub fn header_height() -> f32 {
    MONTH_ROW_HEIGHT + DAY_ROW_HEIGHT
}

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_cell() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(13.0)
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD; // TextEdit bg

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.widgets.open.bg_fill = Color32::from_rgb(50, 52, 66);
    visuals.widgets.open.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.open.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.open.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    visuals.striped = false;
    visuals.faint_bg_color = BG_PANEL;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
