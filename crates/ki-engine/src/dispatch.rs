//! Keydown classification: run a handler, alert, or pass through.

use ki_config::{Handler, ShortcutRegistry};
use ki_keycode::Chord;
use ki_mode::{ENTER_ENTITY_MODE, Session};
use tracing::{debug, trace, warn};

/// Handler synthesized for unmatched keys in normal mode: record the chord
/// as the pending action and move to entity mode.
fn pending_action() -> Handler {
    Handler::callback(|session, chord| {
        if let Err(e) = session.fire_with_action(ENTER_ENTITY_MODE, chord.clone()) {
            warn!(error = %e, chord = %chord, "pending_action_failed");
        }
        None
    })
}

/// Dispatch one chord against the current mode. Returns true when the
/// event is swallowed.
pub fn dispatch(
    session: &mut Session,
    registry: &ShortcutRegistry,
    chord: &Chord,
    alert_sound: &str,
) -> bool {
    let mode = session.mode().clone();
    let synthesized;
    let handler = match registry.lookup(&mode, chord) {
        Some(s) => Some(s.handler()),
        None if mode.is_normal() => {
            synthesized = pending_action();
            Some(&synthesized)
        }
        None => None,
    };

    let Some(handler) = handler else {
        if mode.is_desktop() {
            trace!(chord = %chord, "key_passthrough");
            return false;
        }
        debug!(mode = %mode, chord = %chord, "key_unmatched");
        session.alert(alert_sound);
        return true;
    };

    trace!(mode = %mode, chord = %chord, handler = ?handler, "key_dispatch");
    session.history_mut().record(mode.clone(), chord.clone());
    let exit = match handler {
        Handler::Entity(entity) => {
            let history = session.history();
            entity.dispatch_action(&mode, history.action(), history.workflow())
        }
        Handler::Callback(cb) => cb.call(session, chord),
    };
    if exit == Some(true) {
        match session.exit_mode() {
            Ok(Some(t)) => debug!(from = %t.from, "auto_exit"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, mode = %session.mode(), "auto_exit_failed"),
        }
    }
    true
}

/// Unknown keycodes never match a shortcut.
pub fn unmatched(session: &Session, alert_sound: &str) -> bool {
    if session.mode().is_desktop() {
        return false;
    }
    session.alert(alert_sound);
    true
}
