//! Shortcut tuples and their handlers.

use std::{fmt, sync::Arc};

use ki_keycode::Chord;
use ki_mode::{Mode, Session, WorkflowEvent};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Plain handler body: receives the session and the chord (flags + key name)
/// of the event. `Some(true)` asks the engine to exit back to desktop.
pub type CallbackFn = dyn Fn(&mut Session, &Chord) -> Option<bool> + Send + Sync;

/// Caller hook run after a mode-entry transition fires: `(session, from, to)`.
pub type TransitionCallback = Arc<dyn Fn(&mut Session, &Mode, &Mode) + Send + Sync>;

/// Capability exposed by automatable targets (applications, files, URLs).
pub trait EntityAction: Send + Sync {
    /// Display name, used for remapping by `mode + name`.
    fn name(&self) -> &str;

    /// Identifying attribute (url, path, or name) used by default-config
    /// filters.
    fn identifier(&self) -> &str {
        self.name()
    }

    /// Perform the action for `mode`, given the pending action captured in
    /// normal mode and the events recorded in this workflow. `Some(true)`
    /// asks the engine to exit back to desktop.
    fn dispatch_action(
        &self,
        mode: &Mode,
        action: Option<&Chord>,
        workflow: &[WorkflowEvent],
    ) -> Option<bool>;
}

/// A plain callback, optionally tagged with the transition it fires.
#[derive(Clone)]
pub struct Callback {
    /// The handler body.
    f: Arc<CallbackFn>,
    /// Transition fired by this callback, when built with [`Callback::enter`].
    transition: Option<String>,
}

impl Callback {
    /// Wrap a handler body.
    pub fn new(f: impl Fn(&mut Session, &Chord) -> Option<bool> + Send + Sync + 'static) -> Self {
        Self {
            f: Arc::new(f),
            transition: None,
        }
    }

    /// Combinator for mode-entry shortcuts: fire `transition`, then call
    /// `then(session, from, to)` when given.
    ///
    /// The original callback is never modified; a failed transition skips
    /// `then` and is logged.
    pub fn enter(transition: impl Into<String>, then: Option<TransitionCallback>) -> Self {
        let name = transition.into();
        let event = name.clone();
        let f = move |session: &mut Session, _chord: &Chord| -> Option<bool> {
            match session.fire(&event) {
                Ok(t) => {
                    if let Some(cb) = &then {
                        cb(session, &t.from, &t.to);
                    }
                }
                Err(e) => warn!(error = %e, "transition_failed"),
            }
            None
        };
        Self {
            f: Arc::new(f),
            transition: Some(name),
        }
    }

    /// The transition this callback fires, if built with [`Callback::enter`].
    pub fn transition(&self) -> Option<&str> {
        self.transition.as_deref()
    }

    /// Invoke the handler body.
    pub fn call(&self, session: &mut Session, chord: &Chord) -> Option<bool> {
        (self.f)(session, chord)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// What a shortcut runs: a plain callback or an entity's action dispatcher.
#[derive(Clone)]
pub enum Handler {
    /// Invoked with `(session, chord)`.
    Callback(Callback),
    /// Invoked with `(mode, pending action, workflow)`.
    Entity(Arc<dyn EntityAction>),
}

impl Handler {
    /// Wrap a plain handler body.
    pub fn callback(
        f: impl Fn(&mut Session, &Chord) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        Self::Callback(Callback::new(f))
    }

    /// Wrap an entity.
    pub fn entity(entity: impl EntityAction + 'static) -> Self {
        Self::Entity(Arc::new(entity))
    }

    /// Fire `transition` (see [`Callback::enter`]).
    pub fn enter(transition: impl Into<String>) -> Self {
        Self::Callback(Callback::enter(transition, None))
    }

    /// The entity behind this handler, if any.
    pub fn as_entity(&self) -> Option<&dyn EntityAction> {
        match self {
            Self::Entity(e) => Some(e.as_ref()),
            Self::Callback(_) => None,
        }
    }

    /// The transition a callback handler fires, if known.
    pub fn transition(&self) -> Option<&str> {
        match self {
            Self::Callback(c) => c.transition(),
            Self::Entity(_) => None,
        }
    }
}

impl From<Callback> for Handler {
    fn from(c: Callback) -> Self {
        Self::Callback(c)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(c) => c.fmt(f),
            Self::Entity(e) => f.debug_tuple("Entity").field(&e.name()).finish(),
        }
    }
}

/// Category and description shown for a shortcut; also a remap key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Grouping, e.g. "Entities" or "Normal Mode".
    pub category: String,
    /// What the shortcut does, e.g. "Safari" or "Exit to Desktop Mode".
    pub description: String,
}

impl Metadata {
    /// Build metadata.
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
        }
    }
}

/// A registered shortcut: chord, handler, and metadata.
///
/// Immutable once built; remapping produces a rebound copy.
#[derive(Debug, Clone)]
pub struct Shortcut {
    chord: Chord,
    handler: Handler,
    metadata: Metadata,
}

impl Shortcut {
    /// Build a shortcut.
    pub fn new(chord: Chord, handler: impl Into<Handler>, metadata: Metadata) -> Self {
        Self {
            chord,
            handler: handler.into(),
            metadata,
        }
    }

    /// The chord, which is also the shortcut's identity within a mode.
    pub fn chord(&self) -> &Chord {
        &self.chord
    }

    /// The handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Category and description.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Name of the entity behind the handler, if any.
    pub fn entity_name(&self) -> Option<&str> {
        self.handler.as_entity().map(|e| e.name())
    }

    /// Copy of this shortcut bound to a different chord.
    pub fn rebind(&self, chord: Chord) -> Self {
        Self {
            chord,
            handler: self.handler.clone(),
            metadata: self.metadata.clone(),
        }
    }
}
