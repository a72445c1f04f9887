//! Messages the engine sends to its UI collaborators: the status display,
//! the audible alert and user-facing notifications.
use ki_keycode::Chord;
use serde::{Deserialize, Serialize};

/// Channel helpers for UI messages.
pub mod ipc {
    use super::UiMsg;

    /// Tokio unbounded sender for UI messages.
    pub type UiTx = tokio::sync::mpsc::UnboundedSender<UiMsg>;
    /// Tokio unbounded receiver for UI messages.
    pub type UiRx = tokio::sync::mpsc::UnboundedReceiver<UiMsg>;

    /// Create a standard unbounded UI channel (sender, receiver).
    pub fn ui_channel() -> (UiTx, UiRx) {
        tokio::sync::mpsc::unbounded_channel::<UiMsg>()
    }
}

/// Messages sent from the engine to UI clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMsg {
    /// The mode changed (or the engine started): show the mode name and the
    /// pending action captured in normal mode, if any.
    Status {
        mode: String,
        pending: Option<Chord>,
    },

    /// Play a named system sound. Used to acknowledge a key that matched
    /// nothing in a non-desktop mode.
    Alert { sound: String },

    /// Notification request for the UI
    Notify {
        kind: NotifyKind,
        title: String,
        text: String,
    },
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Info,
    Warn,
    Error,
    Success,
}
