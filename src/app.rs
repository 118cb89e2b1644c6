use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::chart::{ChartEvent, ViewportController};
use crate::config::{ChartSettings, SettingsStore};
use crate::error::ConfigError;
use crate::model::calendar;
use crate::model::{Memo, Schedule};
use crate::ui;
use crate::ui::gantt_chart::ChartViewState;

/// Main application state.
pub struct GanttApp {
    pub schedule: Schedule,
    pub file_path: Option<PathBuf>,
    pub controller: ViewportController,
    pub chart_state: ChartViewState,

    settings: ChartSettings,
    settings_store: SettingsStore,

    // Dialog state
    pub show_about: bool,
    pub memo_draft: Option<Memo>,
    pub jump_date: NaiveDate,

    // Status message
    pub status_message: String,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, ConfigError> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let settings_store = SettingsStore::open_default();
        let settings = settings_store.load();
        let today = calendar::today();
        let mut controller = ViewportController::new(today, &settings)?;

        let mut status_message = "Ready".to_string();
        let (schedule, file_path) = match settings.last_file.clone() {
            Some(path) => match crate::io::load_schedule(&path) {
                Ok(schedule) => (schedule, Some(path)),
                Err(e) => {
                    warn!(error = %e, "could not reopen the last schedule");
                    status_message = format!("Error loading: {}", e);
                    (crate::io::sample_schedule(today), None)
                }
            },
            None => (crate::io::sample_schedule(today), None),
        };

        controller.set_tasks(schedule.tasks.clone());
        controller.set_memos(schedule.memos.clone());
        controller.mount();

        Ok(Self {
            schedule,
            file_path,
            controller,
            chart_state: ChartViewState::default(),
            settings,
            settings_store,
            show_about: false,
            memo_draft: None,
            jump_date: today,
            status_message,
        })
    }

    // --- File operations ---

    pub fn new_schedule(&mut self) {
        self.replace_schedule(Schedule::default(), None);
        self.status_message = "New schedule created".to_string();
    }

    pub fn open_schedule(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Schedule", &["schedule.json", "json"])
            .pick_file()
        {
            match crate::io::load_schedule(&path) {
                Ok(schedule) => {
                    self.replace_schedule(schedule, Some(path));
                    self.status_message = "Schedule loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_schedule(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.write_schedule(path);
        } else {
            self.save_schedule_as();
        }
    }

    pub fn save_schedule_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Schedule", &["schedule.json", "json"])
            .set_file_name(format!("{}.schedule.json", self.schedule.name))
            .save_file()
        {
            self.write_schedule(path);
        }
    }

    fn write_schedule(&mut self, path: PathBuf) {
        self.schedule.touch();
        match crate::io::save_schedule(&self.schedule, &path) {
            Ok(()) => {
                self.status_message = "Schedule saved".to_string();
                self.remember_file(Some(path));
            }
            Err(e) => self.status_message = format!("Error saving: {}", e),
        }
    }

    fn replace_schedule(&mut self, schedule: Schedule, path: Option<PathBuf>) {
        self.controller.set_tasks(schedule.tasks.clone());
        self.controller.set_memos(schedule.memos.clone());
        self.schedule = schedule;
        self.memo_draft = None;
        self.remember_file(path);
    }

    fn remember_file(&mut self, path: Option<PathBuf>) {
        self.file_path = path.clone();
        if self.settings.last_file != path {
            self.settings.last_file = path;
            self.save_settings();
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            warn!(error = %e, "could not save settings");
            self.status_message = format!("Error saving settings: {}", e);
        }
    }

    // --- Chart operations ---

    /// Centre a day picked in the toolbar.
    pub fn jump_to(&mut self, day: NaiveDate) {
        if self.controller.window().contains(day) {
            self.controller.scroll_to_date(day);
        } else {
            let window = self.controller.window();
            self.status_message = format!(
                "{} is outside the loaded range ({} → {})",
                day,
                window.range_start(),
                window.range_end()
            );
        }
    }

    /// Drop a new memo at the focused cell (or today's column) and open it
    /// for editing.
    pub fn add_memo(&mut self) {
        let (x, y) = self.controller.new_memo_position().unwrap_or((
            self.controller.dims().sticky_width(),
            self.controller.dims().header_height(),
        ));
        let memo = Memo::new_at(x + 8.0, y + 8.0);
        self.controller.edit_memo(memo.clone());
        self.memo_draft = Some(memo);
    }

    /// Apply everything the chart asked for since the last frame.
    fn apply_chart_events(&mut self) {
        let mut tasks_changed = false;
        for event in self.controller.take_events() {
            match event {
                ChartEvent::RangeChanged { start, end } => {
                    debug!(%start, %end, "materialized range changed");
                }
                ChartEvent::MemoChanged(memo) => {
                    self.schedule.upsert_memo(memo);
                }
                ChartEvent::MemoDeleted(id) => {
                    if self.schedule.remove_memo(&id) {
                        self.status_message = "Memo deleted".to_string();
                    }
                }
                ChartEvent::ProgressInput(intent) => {
                    if self.schedule.apply_progress(&intent) {
                        info!(task = %intent.task_id, value = intent.added_value, date = %intent.date, "progress recorded");
                        self.status_message =
                            format!("Logged +{}% on {}", intent.added_value, intent.date);
                        tasks_changed = true;
                    }
                }
                ChartEvent::TaskClicked(id) => {
                    if let Some(task) = self.schedule.tasks.iter().find(|t| t.id == id) {
                        self.status_message = format!(
                            "'{}' ({} → {}, {:.0}%)",
                            task.name,
                            task.start.format("%Y-%m-%d"),
                            task.end.format("%Y-%m-%d"),
                            task.progress
                        );
                    }
                }
            }
        }
        if tasks_changed {
            self.controller.set_tasks(self.schedule.tasks.clone());
        }
    }

    fn shutdown(&mut self) {
        self.controller.teardown();
        self.save_settings();
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_schedule();
        }
        if !ctx.wants_keyboard_input() {
            let (page_up, page_down) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::PageUp),
                    i.key_pressed(egui::Key::PageDown),
                )
            });
            if page_up {
                self.controller.scroll_vertical_by_page(-1);
            }
            if page_down {
                self.controller.scroll_vertical_by_page(1);
            }
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let shown = self.controller.views().len();
                        let total = self.schedule.tasks.len();
                        let tasks = if shown == total {
                            format!("Tasks: {}", total)
                        } else {
                            format!("Tasks: {} of {}", shown, total)
                        };
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · Memos: {} · Days: {}",
                                tasks,
                                self.schedule.memos.len(),
                                self.controller.window().len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            let interaction = ui::gantt_chart::show_gantt_chart(
                &mut self.controller,
                &mut self.chart_state,
                ui,
            );
            if let Some(memo) = interaction.edit_memo {
                self.memo_draft = Some(memo);
            }
        });

        // Dialogs
        if self.memo_draft.is_some() {
            ui::dialogs::show_memo_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }

        self.apply_chart_events();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }
    }
}
