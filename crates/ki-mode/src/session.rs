use ki_keycode::Chord;
use tracing::debug;

use crate::{
    DeferQueue, EXIT_MODE, Mode, ModeError, ModeMachine, NotificationDispatcher, Transition,
    WorkflowHistory,
};

/// Context object handed to every handler.
///
/// Owns the mode machine, the workflow history, the UI notifier and the
/// deferred task queue. The engine constructs one at startup and mutates it
/// only from the single dispatch call stack.
#[derive(Debug)]
pub struct Session {
    /// Mode state machine.
    machine: ModeMachine,
    /// Events since the last desktop entry.
    history: WorkflowHistory,
    /// UI sink for status, alerts and notifications.
    notifier: NotificationDispatcher,
    /// True while attached to the key event source.
    listening: bool,
    /// Work to run after the current dispatch.
    deferred: DeferQueue,
}

impl Session {
    /// A fresh session on desktop with the built-in modes.
    pub fn new(notifier: NotificationDispatcher) -> Self {
        Self {
            machine: ModeMachine::new(),
            history: WorkflowHistory::new(),
            notifier,
            listening: false,
            deferred: DeferQueue::new(),
        }
    }

    /// The active mode.
    pub fn mode(&self) -> &Mode {
        self.machine.current()
    }

    /// Read access to the machine.
    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    /// Mutable access to the machine, for registering states and edges.
    ///
    /// Changing modes through `ModeMachine::apply` directly bypasses the
    /// enter hook; use [`Session::fire`] for that.
    pub fn machine_mut(&mut self) -> &mut ModeMachine {
        &mut self.machine
    }

    /// The workflow history.
    pub fn history(&self) -> &WorkflowHistory {
        &self.history
    }

    /// Mutable access to the workflow history.
    pub fn history_mut(&mut self) -> &mut WorkflowHistory {
        &mut self.history
    }

    /// The UI notifier.
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    /// True while the engine is attached to its key source.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Mark the session as attached or detached.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Fire a transition out of the current mode and run the enter hook.
    pub fn fire(&mut self, event: &str) -> Result<Transition, ModeError> {
        let t = self.machine.apply(event)?;
        self.on_enter(&t);
        Ok(t)
    }

    /// Record `action` as pending, then fire `event`.
    ///
    /// The action is only recorded when the transition is valid, so the
    /// enter hook (and the status display) sees it.
    pub fn fire_with_action(
        &mut self,
        event: &str,
        action: Chord,
    ) -> Result<Transition, ModeError> {
        self.machine.resolve(event)?;
        self.history.set_action(action);
        self.fire(event)
    }

    /// Take the current mode's edge to desktop. A no-op on desktop.
    ///
    /// Uses `exitMode` where registered, otherwise whatever desktop-bound
    /// edge the mode was given (see [`ModeMachine::exit_edge`]).
    pub fn exit_mode(&mut self) -> Result<Option<Transition>, ModeError> {
        let current = self.machine.current();
        if current.is_desktop() {
            return Ok(None);
        }
        let event = match self.machine.exit_edge(current) {
            Some(t) => t.name.clone(),
            None => {
                return Err(ModeError::InvalidTransition {
                    event: EXIT_MODE.to_string(),
                    from: current.to_string(),
                });
            }
        };
        self.fire(&event).map(Some)
    }

    /// Show the current mode on the status display.
    pub fn announce(&self) {
        self.notifier
            .send_status(self.machine.current(), self.history.action());
    }

    /// Play the named alert sound.
    pub fn alert(&self, sound: &str) {
        self.notifier.send_alert(sound);
    }

    /// Run `task` after the current dispatch has unwound and before the
    /// next key event is handled.
    pub fn defer(&mut self, task: impl FnOnce(&mut Self) + Send + 'static) {
        self.deferred.push(Box::new(task));
    }

    /// Number of tasks waiting to run.
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Drain the deferred queue, including tasks deferred by tasks.
    ///
    /// Returns the number of tasks run.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop() {
            task(self);
            ran += 1;
        }
        ran
    }

    /// Generic enter hook, run after every successful transition.
    fn on_enter(&mut self, t: &Transition) {
        debug!(event = %t.name, from = %t.from, to = %t.to, "mode_entered");
        if t.to.is_desktop() {
            self.history.reset();
        }
        if self.listening {
            self.notifier.send_status(&t.to, self.history.action());
        }
    }
}
