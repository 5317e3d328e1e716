pub mod calendar;
pub mod confirm;
pub mod task;

pub use calendar::{GridCell, MonthCursor, GRID_CELLS};
pub use confirm::{DeleteConfirm, Press, CONFIRM_WINDOW};
pub use task::{Task, TaskDraft, TaskPatch};
