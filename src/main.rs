#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod chart;
mod config;
mod error;
mod io;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

type DynError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Schedule Gantt"),
        ..Default::default()
    };

    eframe::run_native(
        "Schedule Gantt",
        options,
        Box::new(
            |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, DynError> {
                Ok(Box::new(app::GanttApp::new(cc)?))
            },
        ),
    )
}
