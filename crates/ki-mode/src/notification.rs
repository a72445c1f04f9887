use ki_keycode::Chord;
use ki_protocol::{NotifyKind, UiMsg, ipc::UiTx};
use tracing::{info, trace};

use crate::Mode;

/// Sends status updates, alerts and notifications to the UI layer.
///
/// Sends are best-effort: a closed receiver is logged and otherwise ignored,
/// so the status display going away never fails a dispatch.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    tx: UiTx,
}

impl NotificationDispatcher {
    /// Create a new dispatcher from a UI message channel.
    pub fn new(tx: UiTx) -> Self {
        Self { tx }
    }

    /// Show the current mode and pending action on the status display.
    pub fn send_status(&self, mode: &Mode, pending: Option<&Chord>) {
        self.send(UiMsg::Status {
            mode: mode.to_string(),
            pending: pending.cloned(),
        });
    }

    /// Play the named alert sound.
    pub fn send_alert(&self, sound: &str) {
        self.send(UiMsg::Alert {
            sound: sound.to_string(),
        });
    }

    /// Send a notification with the given kind, title, and text.
    pub fn send_notification(&self, kind: NotifyKind, title: String, text: String) {
        info!(kind = ?kind, title = %title, text = %text, "notification_display");
        self.send(UiMsg::Notify { kind, title, text });
    }

    /// Convenience helper to send an error notification.
    pub fn send_error(&self, title: &str, text: String) {
        self.send_notification(NotifyKind::Error, title.to_string(), text)
    }

    fn send(&self, msg: UiMsg) {
        if let Err(e) = self.tx.send(msg) {
            trace!(msg = ?e.0, "ui_channel_closed");
        }
    }
}
