use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use ki_keycode::{Chord, Key, Modifiers, Scancode};

use crate::{Error, Result};

/// A keydown as delivered by the key event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDown {
    /// Modifier set held during the event.
    pub modifiers: Modifiers,
    /// macOS virtual keycode.
    pub keycode: Scancode,
}

impl KeyDown {
    /// Build from raw CGEventFlags and a virtual keycode.
    pub fn from_cg(flags: u64, keycode: Scancode) -> Self {
        Self {
            modifiers: Modifiers::from_cg_flags(flags),
            keycode,
        }
    }

    /// Build from a chord, using the key's virtual keycode.
    pub fn from_chord(chord: &Chord) -> Self {
        Self {
            modifiers: chord.modifiers.clone(),
            keycode: chord.key.keycode(),
        }
    }

    /// Translate to a chord; `None` for keycodes outside the table.
    pub fn chord(&self) -> Option<Chord> {
        let key = Key::try_from(self.keycode).ok()?;
        Some(Chord::new(self.modifiers.clone(), key))
    }
}

/// Attach point for the platform key event source.
///
/// The engine calls `attach` on start and `detach` on stop; events are fed
/// to [`Engine::handle_keydown`](crate::Engine::handle_keydown) or
/// [`Engine::run`](crate::Engine::run) by whoever owns the source.
pub trait KeySource: Send {
    /// Begin capturing keydown events.
    fn attach(&mut self) -> Result<()>;
    /// Stop capturing keydown events.
    fn detach(&mut self);
}

/// A source with nothing behind it. Used by headless replays.
#[derive(Debug, Default)]
pub struct NullKeySource;

impl KeySource for NullKeySource {
    fn attach(&mut self) -> Result<()> {
        Ok(())
    }

    fn detach(&mut self) {}
}

/// Recording source for tests. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockKeySource {
    attached: Arc<AtomicBool>,
    attaches: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockKeySource {
    /// A source that attaches successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next attaches fail.
    pub fn fail_attach(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// True while attached.
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of successful attaches.
    pub fn attach_count(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }
}

impl KeySource for MockKeySource {
    fn attach(&mut self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::KeySource("event tap unavailable".into()));
        }
        self.attached.store(true, Ordering::SeqCst);
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&mut self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}
