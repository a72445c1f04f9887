use std::{collections::VecDeque, fmt};

use crate::Session;

/// Work scheduled to run once the current dispatch has unwound.
pub type Task = Box<dyn FnOnce(&mut Session) + Send>;

/// FIFO of deferred tasks.
///
/// Filled by handlers through `Session::defer` and drained by the engine
/// before it accepts the next key event.
#[derive(Default)]
pub struct DeferQueue {
    tasks: VecDeque<Task>,
}

impl DeferQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` behind everything already queued.
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Next task in FIFO order.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for DeferQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferQueue")
            .field("len", &self.tasks.len())
            .finish()
    }
}
