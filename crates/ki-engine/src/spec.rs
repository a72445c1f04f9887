//! Builders for custom modes and single transitions.

use std::sync::Arc;

use ki_config::{Metadata, TransitionCallback};
use ki_keycode::{Chord, Key};
use ki_mode::{EXIT_MODE, Mode, Session};

/// A custom mode to register with
/// [`Engine::register_mode`](crate::Engine::register_mode).
#[derive(Clone)]
pub struct ModeSpec {
    /// Name of the new mode.
    pub mode: Mode,
    /// Chord in normal mode that enters the mode.
    pub chord: Chord,
    /// Runs after the entry transition fires, with `(session, from, to)`.
    pub callback: Option<TransitionCallback>,
    /// Metadata for the entry shortcut.
    pub metadata: Option<Metadata>,
    /// Entry transition name; defaults to `enter<Mode>Mode`.
    pub enter: Option<String>,
    /// Exit transition name; defaults to `exitMode`.
    pub exit: Option<String>,
}

impl ModeSpec {
    /// A mode entered from normal mode with `chord`.
    pub fn new(mode: impl Into<Mode>, chord: Chord) -> Self {
        Self {
            mode: mode.into(),
            chord,
            callback: None,
            metadata: None,
            enter: None,
            exit: None,
        }
    }

    /// Run `f` after entering the mode.
    pub fn on_enter(
        mut self,
        f: impl Fn(&mut Session, &Mode, &Mode) + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Arc::new(f));
        self
    }

    /// Set the entry shortcut's metadata.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Name the entry transition.
    pub fn enter_transition(mut self, name: impl Into<String>) -> Self {
        self.enter = Some(name.into());
        self
    }

    /// Name the exit transition.
    pub fn exit_transition(mut self, name: impl Into<String>) -> Self {
        self.exit = Some(name.into());
        self
    }

    /// Effective entry transition name.
    pub(crate) fn enter_name(&self) -> String {
        self.enter
            .clone()
            .unwrap_or_else(|| self.mode.enter_transition_name())
    }

    /// Effective exit transition name.
    pub(crate) fn exit_name(&self) -> String {
        self.exit.clone().unwrap_or_else(|| EXIT_MODE.to_string())
    }

    /// Effective entry shortcut metadata.
    pub(crate) fn entry_metadata(&self) -> Metadata {
        self.metadata
            .clone()
            .unwrap_or_else(|| Metadata::new("Normal Mode", format!("Enter {} Mode", self.mode)))
    }

    /// Chord that leaves a custom mode.
    pub(crate) fn exit_chord() -> Chord {
        Chord::bare(Key::Escape)
    }
}

/// A single edge to register with
/// [`Engine::register_mode_transition`](crate::Engine::register_mode_transition).
#[derive(Clone)]
pub struct TransitionSpec {
    /// Transition name.
    pub name: String,
    /// Source mode; the chord is registered here.
    pub from: Mode,
    /// Target mode.
    pub to: Mode,
    /// Chord in `from` that fires the transition.
    pub chord: Chord,
    /// Runs after the transition fires, with `(session, from, to)`.
    pub callback: Option<TransitionCallback>,
    /// Metadata for the shortcut.
    pub metadata: Option<Metadata>,
}

impl TransitionSpec {
    /// An edge `from -> to` named `name`, fired by `chord` in `from`.
    pub fn new(
        name: impl Into<String>,
        from: impl Into<Mode>,
        to: impl Into<Mode>,
        chord: Chord,
    ) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            chord,
            callback: None,
            metadata: None,
        }
    }

    /// Run `f` after the transition fires.
    pub fn on_enter(
        mut self,
        f: impl Fn(&mut Session, &Mode, &Mode) + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Arc::new(f));
        self
    }

    /// Set the shortcut's metadata.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Effective shortcut metadata.
    pub(crate) fn shortcut_metadata(&self) -> Metadata {
        self.metadata.clone().unwrap_or_else(|| {
            Metadata::new(format!("{} Mode", self.from), format!("Enter {} Mode", self.to))
        })
    }
}
