//! Scancodes (macOS hardware virtual keycodes) and conversions.
//!
//! A "scancode" here is the integer delivered with every key-down by the
//! host's input capture (`NSEvent.keyCode`, `kCGKeyboardEventKeycode`). It is
//! positional and layout-independent; `Key::from_keycode` turns it into the
//! canonical key name used for shortcut matching.

use crate::Key;

/// macOS hardware virtual keycode (`kVK_*`, `NSEvent.keyCode`).
pub type Scancode = u16;

impl TryFrom<Scancode> for Key {
    type Error = ();
    fn try_from(value: Scancode) -> Result<Self, Self::Error> {
        Self::from_keycode(value).ok_or(())
    }
}

impl From<Key> for Scancode {
    fn from(k: Key) -> Self {
        k.keycode()
    }
}
