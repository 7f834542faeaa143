//! Small building blocks shared across the TUI.

mod task;
mod text;
mod toast;

pub use task::{TaskId, TaskKind, TaskSeq, TaskState, Tasks};
pub use text::{pad_to_width, truncate_to_width};
pub use toast::{TOAST_DURATION, Toast, ToastKind, Toasts};
