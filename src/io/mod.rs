pub mod file;

pub use file::{load_schedule, sample_schedule, save_schedule};
