use ki_keycode::Chord;
use serde::{Deserialize, Serialize};

use crate::Mode;

/// One dispatched key event, tagged with the mode it was handled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Mode that was active when the key arrived.
    pub mode: Mode,
    /// Modifier flags and key name of the event.
    pub chord: Chord,
}

/// Key events recorded since the last return to desktop, plus the pending
/// action captured in normal mode.
///
/// The engine appends to `workflow` for every dispatched event and clears
/// the whole history the moment the machine lands on desktop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHistory {
    workflow: Vec<WorkflowEvent>,
    action: Option<Chord>,
}

impl WorkflowHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dispatched event.
    pub fn record(&mut self, mode: Mode, chord: Chord) {
        self.workflow.push(WorkflowEvent { mode, chord });
    }

    /// Store the pending action, replacing any previous one.
    pub fn set_action(&mut self, chord: Chord) {
        self.action = Some(chord);
    }

    /// Take the pending action out of the history.
    pub fn take_action(&mut self) -> Option<Chord> {
        self.action.take()
    }

    /// The pending action, if one was captured in normal mode.
    pub fn action(&self) -> Option<&Chord> {
        self.action.as_ref()
    }

    /// Events recorded since the last desktop entry, oldest first.
    pub fn workflow(&self) -> &[WorkflowEvent] {
        &self.workflow
    }

    /// Clear both the workflow and the pending action.
    pub fn reset(&mut self) {
        self.workflow.clear();
        self.action = None;
    }

    /// True when nothing has been recorded and no action is pending.
    pub fn is_empty(&self) -> bool {
        self.workflow.is_empty() && self.action.is_none()
    }
}
