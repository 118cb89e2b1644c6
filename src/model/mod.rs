pub mod calendar;
pub mod memo;
pub mod schedule;
pub mod task;

pub use memo::Memo;
pub use schedule::Schedule;
pub use task::{Task, TaskView};
