//! ki-keycode: Virtual keycodes, modifiers and chords for macOS.
//!
//! - `Key`: Enum of macOS virtual keycodes (HIToolbox `kVK_*` values).
//! - `Modifier` / `Modifiers`: modifier keys and the exact set held for an event.
//! - `Chord`: a modifier set plus a single key. Its canonical string form
//!   ("cmd+shift+n") is the identity used to merge and look up shortcuts.
//!
//! Key names follow the lowercase naming used by the host's keycode map
//! ("n", "escape", "/", "f5").

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::{Modifier, Modifiers};

mod chord;
pub use chord::Chord;

mod scancode;
pub use scancode::Scancode;
