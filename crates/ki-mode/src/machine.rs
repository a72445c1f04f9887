use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::{EXIT_MODE, Mode, ModeError, Transition};

/// Finite-state machine over modes.
///
/// Starts in `desktop` with the built-in `desktop`/`normal`/`entity` states
/// and their transitions. Edges are keyed by `(name, from)`, so one event
/// name can leave several modes (every `exitMode` edge converges on desktop).
/// Exactly one mode is current at any time.
#[derive(Debug, Clone)]
pub struct ModeMachine {
    /// The active mode.
    current: Mode,
    /// Registered states.
    states: BTreeSet<Mode>,
    /// Registered edges in declaration order.
    transitions: Vec<Transition>,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeMachine {
    /// Create a machine in desktop mode with the built-in states and edges.
    pub fn new() -> Self {
        let states = [Mode::desktop(), Mode::normal(), Mode::entity()]
            .into_iter()
            .collect();
        Self {
            current: Mode::desktop(),
            states,
            transitions: Transition::defaults(),
        }
    }

    /// The active mode.
    pub fn current(&self) -> &Mode {
        &self.current
    }

    /// True if `mode` is the active mode.
    pub fn is(&self, mode: &str) -> bool {
        self.current == mode
    }

    /// True if `mode` is a registered state.
    pub fn has_state(&self, mode: &Mode) -> bool {
        self.states.contains(mode)
    }

    /// Registered states in name order.
    pub fn states(&self) -> impl Iterator<Item = &Mode> {
        self.states.iter()
    }

    /// Registered transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Register a state. Returns false if it already existed.
    pub fn add_state(&mut self, mode: Mode) -> bool {
        let added = self.states.insert(mode.clone());
        if added {
            debug!(mode = %mode, "state_added");
        }
        added
    }

    /// Check that `t` could be added without changing the machine.
    ///
    /// Returns `Ok(true)` if the edge is new, `Ok(false)` if an identical edge
    /// already exists.
    pub fn check_transition(&self, t: &Transition) -> Result<bool, ModeError> {
        for m in [&t.from, &t.to] {
            if !self.has_state(m) {
                return Err(ModeError::UnknownMode {
                    mode: m.to_string(),
                });
            }
        }
        match self.edge(&t.name, &t.from) {
            Some(existing) if existing.to == t.to => Ok(false),
            Some(existing) => Err(ModeError::DuplicateTransition {
                event: t.name.clone(),
                from: t.from.to_string(),
                existing: existing.to.to_string(),
                requested: t.to.to_string(),
            }),
            None => Ok(true),
        }
    }

    /// Register a transition between two known states.
    ///
    /// Re-adding an identical edge is a no-op.
    pub fn add_transition(&mut self, t: Transition) -> Result<(), ModeError> {
        if self.check_transition(&t)? {
            debug!(transition = %t, "transition_added");
            self.transitions.push(t);
        }
        Ok(())
    }

    /// True if any edge carries this event name.
    pub fn has_event(&self, event: &str) -> bool {
        self.transitions.iter().any(|t| t.name == event)
    }

    /// True if an edge named `event` leaves `from`.
    pub fn leaves(&self, event: &str, from: &Mode) -> bool {
        self.edge(event, from).is_some()
    }

    /// The edge that leaves `from` for desktop: `exitMode` when registered
    /// there, otherwise the first desktop-bound edge out of `from`.
    pub fn exit_edge(&self, from: &Mode) -> Option<&Transition> {
        self.edge(EXIT_MODE, from)
            .filter(|t| t.to.is_desktop())
            .or_else(|| {
                self.transitions
                    .iter()
                    .find(|t| &t.from == from && t.to.is_desktop())
            })
    }

    /// True if `event` can fire from the current mode.
    pub fn can(&self, event: &str) -> bool {
        self.edge(event, &self.current).is_some()
    }

    /// Resolve the edge `event` would take from the current mode.
    pub fn resolve(&self, event: &str) -> Result<&Transition, ModeError> {
        match self.edge(event, &self.current) {
            Some(t) => Ok(t),
            None if self.has_event(event) => Err(ModeError::InvalidTransition {
                event: event.to_string(),
                from: self.current.to_string(),
            }),
            None => Err(ModeError::UnknownTransition {
                event: event.to_string(),
            }),
        }
    }

    /// Take the edge named `event` out of the current mode.
    ///
    /// Nothing changes on error. Enter hooks are the caller's concern; see
    /// `Session::fire`.
    pub fn apply(&mut self, event: &str) -> Result<Transition, ModeError> {
        let t = self.resolve(event)?.clone();
        trace!(transition = %t, "transition_apply");
        self.current = t.to.clone();
        Ok(t)
    }

    /// Find the edge `(event, from)`.
    fn edge(&self, event: &str, from: &Mode) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.name == event && &t.from == from)
    }
}
