pub mod dialogs;
pub mod filter_popup;
pub mod gantt_chart;
pub mod theme;
pub mod toolbar;
