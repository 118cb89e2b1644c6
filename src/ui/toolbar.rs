use crate::app::GanttApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Schedule").clicked() {
                app.new_schedule();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_schedule();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_schedule();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_schedule_as();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Go to Today").clicked() {
                app.controller.scroll_to_today();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Previous Span").clicked() {
                app.controller.move_span(-1);
                ui.close_menu();
            }
            if ui.button("  Next Span").clicked() {
                app.controller.move_span(1);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Page Up        PgUp").clicked() {
                app.controller.scroll_vertical_by_page(-1);
                ui.close_menu();
            }
            if ui.button("  Page Down    PgDn").clicked() {
                app.controller.scroll_vertical_by_page(1);
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(format!("{} Today", icons::CALENDAR))
            .on_hover_text("Centre today's column")
            .clicked()
        {
            app.controller.scroll_to_today();
        }
        if ui
            .button(icons::CARET_LEFT)
            .on_hover_text("Previous span")
            .clicked()
        {
            app.controller.move_span(-1);
        }
        if ui
            .button(icons::CARET_RIGHT)
            .on_hover_text("Next span")
            .clicked()
        {
            app.controller.move_span(1);
        }

        // Jump to any materialized day.
        let jump = ui.add(
            egui_extras::DatePickerButton::new(&mut app.jump_date)
                .id_salt("dp_jump"),
        );
        if jump.changed() {
            app.jump_to(app.jump_date);
        }

        ui.separator();

        if ui
            .button(format!("{} Memo", icons::NOTE))
            .on_hover_text("Add a memo at today's column")
            .clicked()
        {
            app.add_memo();
        }

        // Right-aligned schedule name and visible range
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.schedule.name, modified))
                    .size(11.0)
                    .weak(),
            );
            let window = app.controller.window();
            ui.label(
                RichText::new(format!("{} → {}", window.range_start(), window.range_end()))
                    .font(theme::font_small())
                    .color(theme::TEXT_DIM),
            );
        });
    });
}
