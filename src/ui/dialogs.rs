use crate::app::GanttApp;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Render the memo editor for `app.memo_draft`.
pub fn show_memo_dialog(app: &mut GanttApp, ctx: &Context) {
    let Some(draft) = app.memo_draft.as_mut() else {
        return;
    };
    let mut save = false;
    let mut delete = false;
    let mut should_close = false;

    Window::new(RichText::new("Memo").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            ui.add(
                egui::TextEdit::multiline(&mut draft.text)
                    .hint_text("Write a note...")
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            );
            ui.label(
                RichText::new(format!(
                    "{:.0} × {:.0} at ({:.0}, {:.0})",
                    draft.width, draft.height, draft.x, draft.y
                ))
                .font(theme::font_small())
                .color(theme::TEXT_DIM),
            );

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    save = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let delete_btn = egui::Button::new(
                        RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                            .color(theme::TODAY_LINE),
                    );
                    if ui.add(delete_btn).clicked() {
                        delete = true;
                    }
                });
            });
            ui.add_space(2.0);
        });

    if save {
        if let Some(memo) = app.memo_draft.take() {
            app.controller.edit_memo(memo);
        }
    } else if delete {
        if let Some(memo) = app.memo_draft.take() {
            app.controller.delete_memo(&memo.id);
        }
    } else if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.memo_draft = None;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 200.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Schedule Gantt").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Shift + wheel scrolls the dates.");
                ui.label("Double-click a day to log progress.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
