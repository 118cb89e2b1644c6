use egui::{Id, Key, Pos2, RichText};

use crate::chart::{FilterColumn, ViewportController};
use crate::ui::theme;

/// Option list for one pinned column, hanging under its header cell.
///
/// Ticking an option filters immediately; the keyword only narrows the list
/// of options shown here, never the tasks. The header button toggles it and
/// a click on the chart body or Escape closes it.
pub fn show_filter_popup(
    ctx: &egui::Context,
    controller: &mut ViewportController,
    column: FilterColumn,
    anchor: Pos2,
) {
    let Some(state) = controller.filters().state(column).cloned() else {
        controller.close_filter_popup();
        return;
    };

    egui::Area::new(Id::new(("filter-popup", column)))
        .order(egui::Order::Foreground)
        .fixed_pos(anchor)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_min_width(180.0);
                ui.label(
                    RichText::new(format!("Filter by {}", column.label()))
                        .font(theme::font_header())
                        .color(theme::TEXT_SECONDARY),
                );

                let mut keyword = state.keyword_prefix.clone();
                let search = ui.add(
                    egui::TextEdit::singleline(&mut keyword)
                        .hint_text("Starts with…")
                        .desired_width(f32::INFINITY),
                );
                if search.changed() {
                    controller.set_filter_keyword(column, &keyword);
                }
                ui.separator();

                let mut all = state.selected.len() == state.all_options.len();
                if ui.checkbox(&mut all, "All").changed() {
                    controller.select_all_filter(column, all);
                }

                // Owned copy: toggling below mutates the engine.
                let options: Vec<String> = controller
                    .filters()
                    .filtered_options(column)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                egui::ScrollArea::vertical()
                    .id_salt(("filter-options", column))
                    .max_height(240.0)
                    .show(ui, |ui| {
                        if options.is_empty() {
                            ui.label(RichText::new("No matches").color(theme::TEXT_DIM));
                        }
                        for option in &options {
                            let mut included = state.selected.contains(option);
                            let label = if option.is_empty() { "(blank)" } else { option };
                            if ui.checkbox(&mut included, label).changed() {
                                controller.set_filter_selected(column, option, included);
                            }
                        }
                    });
            });
        });

    if ctx.input(|i| i.key_pressed(Key::Escape)) {
        controller.close_filter_popup();
    }
}
