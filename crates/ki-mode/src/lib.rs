//! The modal core of ki: which mode is active, how modes change, and what
//! has been typed since the last return to the desktop.
//!
//! - [`ModeMachine`]: finite-state machine over named modes and transitions.
//! - [`WorkflowHistory`]: key events recorded since the last desktop entry,
//!   plus the pending action captured in normal mode.
//! - [`Session`]: the context object handed to every handler; owns the
//!   machine, the history, the UI notifier and the deferred task queue.
mod defer;
mod error;
mod history;
mod machine;
mod mode;
mod notification;
mod session;

pub use defer::{DeferQueue, Task};
pub use error::ModeError;
pub use history::{WorkflowEvent, WorkflowHistory};
pub use machine::ModeMachine;
pub use mode::{ENTER_ENTITY_MODE, ENTER_NORMAL_MODE, EXIT_MODE, Mode, Transition};
pub use notification::NotificationDispatcher;
pub use session::Session;
