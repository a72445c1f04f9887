//! ki engine
//!
//! Ties the modal core together:
//! - attaches to a key event source ([`KeySource`]) on start and detaches on stop
//! - classifies each keydown against the active mode's shortcuts
//! - runs callbacks and entity actions, records the workflow, auto-exits
//! - registers shortcuts, custom modes, transitions, remaps and defaults,
//!   validating everything before any change and reporting failures to the UI
//!
//! Construct an [`Engine`] with a source and a UI channel, register
//! configuration, then call [`Engine::start`] and feed events through
//! [`Engine::handle_keydown`] or the async [`Engine::run`] loop.

mod deps;
mod dispatch;
mod error;
mod spec;

use std::slice;

use ki_config::{
    Callback, DefaultConfig, FilterOptions, MergeStats, Metadata, RemapReport, RemapTable,
    Shortcut, ShortcutRegistry, validate_shortcuts,
};
use ki_keycode::Chord;
use ki_mode::{
    Mode, ModeError, ModeMachine, NotificationDispatcher, Session, Transition, WorkflowHistory,
};
use ki_protocol::ipc::UiTx;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, trace};

pub use deps::{KeyDown, KeySource, MockKeySource, NullKeySource};
pub use error::{Error, Result};
pub use spec::{ModeSpec, TransitionSpec};

/// Sound played for unmatched keys outside desktop mode.
pub const DEFAULT_ALERT_SOUND: &str = "Funk";

/// Counts from one [`Engine::run`] loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events consumed from the channel.
    pub events: usize,
    /// Events the engine swallowed.
    pub swallowed: usize,
}

/// The top-level modal engine.
///
/// Owns the [`Session`] (mode machine, workflow history, deferred tasks),
/// the [`ShortcutRegistry`] and the key source. All mutation happens on the
/// caller's task, one event at a time.
pub struct Engine {
    /// Context handed to handlers.
    session: Session,
    /// Per-mode shortcut lists.
    registry: ShortcutRegistry,
    /// Platform key capture.
    source: Box<dyn KeySource>,
    /// Sound for unmatched keys.
    alert_sound: String,
}

impl Engine {
    /// Create an engine on desktop with no shortcuts registered.
    pub fn new(source: impl KeySource + 'static, ui_tx: UiTx) -> Self {
        Self {
            session: Session::new(NotificationDispatcher::new(ui_tx)),
            registry: ShortcutRegistry::new(),
            source: Box::new(source),
            alert_sound: DEFAULT_ALERT_SOUND.to_string(),
        }
    }

    /// Use a different alert sound for unmatched keys.
    pub fn with_alert_sound(mut self, sound: impl Into<String>) -> Self {
        self.alert_sound = sound.into();
        self
    }

    /// Attach to the key source and begin listening. Emits the current status.
    pub fn start(&mut self) -> Result<()> {
        if self.session.is_listening() {
            return Ok(());
        }
        self.source.attach()?;
        self.session.set_listening(true);
        self.session.announce();
        info!(mode = %self.session.mode(), "engine_started");
        Ok(())
    }

    /// Detach from the key source.
    pub fn stop(&mut self) {
        if !self.session.is_listening() {
            return;
        }
        self.source.detach();
        self.session.set_listening(false);
        info!("engine_stopped");
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.session.is_listening()
    }

    /// Handle one keydown. Returns true when the event is swallowed, false
    /// when it should propagate to the OS.
    ///
    /// Deferred tasks queued during the dispatch run before this returns.
    pub fn handle_keydown(&mut self, event: KeyDown) -> bool {
        match event.chord() {
            Some(chord) => self.dispatch(&chord),
            None => {
                trace!(keycode = event.keycode, "unknown_keycode");
                let swallowed = dispatch::unmatched(&self.session, &self.alert_sound);
                self.session.run_deferred();
                swallowed
            }
        }
    }

    /// Dispatch a chord as if it had been typed.
    pub fn dispatch(&mut self, chord: &Chord) -> bool {
        let swallowed =
            dispatch::dispatch(&mut self.session, &self.registry, chord, &self.alert_sound);
        let ran = self.session.run_deferred();
        if ran > 0 {
            trace!(ran, "deferred_drained");
        }
        swallowed
    }

    /// Consume keydowns until every sender is dropped, then stop.
    ///
    /// Starts the engine if needed. Events are handled strictly one at a
    /// time, each to completion.
    pub async fn run(&mut self, mut rx: UnboundedReceiver<KeyDown>) -> Result<RunSummary> {
        self.start()?;
        let mut summary = RunSummary::default();
        while let Some(event) = rx.recv().await {
            summary.events += 1;
            if self.handle_keydown(event) {
                summary.swallowed += 1;
            }
        }
        self.stop();
        debug!(events = summary.events, swallowed = summary.swallowed, "run_finished");
        Ok(summary)
    }

    /// Report a failed registration to the UI and hand the error back.
    fn report<T>(&self, op: &str, r: Result<T>) -> Result<T> {
        if let Err(e) = &r {
            self.session.notifier().send_error(op, e.to_string());
        }
        r
    }

    /// Merge `shortcuts` into `mode`'s list. Later chords replace earlier
    /// ones in place.
    pub fn register_shortcuts(
        &mut self,
        mode: impl Into<Mode>,
        shortcuts: Vec<Shortcut>,
    ) -> Result<MergeStats> {
        let mode = mode.into();
        let checked = validate_shortcuts(self.session.machine(), &mode, &shortcuts);
        self.report("register_shortcuts", checked.map_err(Error::from))?;
        Ok(self.registry.register(&mode, shortcuts))
    }

    /// Register a custom mode: its state, the entry edge from normal mode,
    /// the exit edge back to desktop, the entry chord in normal mode and an
    /// `escape` exit chord inside the mode.
    ///
    /// Built-in mode names and the empty name are rejected.
    pub fn register_mode(&mut self, spec: ModeSpec) -> Result<()> {
        let staged = self.stage_mode(&spec);
        let (machine, entries) = self.report("register_mode", staged)?;
        *self.session.machine_mut() = machine;
        for (mode, shortcut) in entries {
            self.registry.register(&mode, vec![shortcut]);
        }
        debug!(mode = %spec.mode, "mode_registered");
        Ok(())
    }

    /// Build the machine and shortcuts a mode registration would produce.
    fn stage_mode(&self, spec: &ModeSpec) -> Result<(ModeMachine, Vec<(Mode, Shortcut)>)> {
        if spec.mode.is_reserved() {
            return Err(ModeError::ReservedMode {
                mode: spec.mode.to_string(),
            }
            .into());
        }
        let mut machine = self.session.machine().clone();
        machine.add_state(spec.mode.clone());
        let enter = spec.enter_name();
        let exit = spec.exit_name();
        machine.add_transition(Transition::new(enter.clone(), Mode::normal(), spec.mode.clone()))?;
        machine.add_transition(Transition::new(exit.clone(), spec.mode.clone(), Mode::desktop()))?;

        let entry = Shortcut::new(
            spec.chord.clone(),
            Callback::enter(enter, spec.callback.clone()),
            spec.entry_metadata(),
        );
        let leave = Shortcut::new(
            ModeSpec::exit_chord(),
            Callback::enter(exit, None),
            Metadata::new(format!("{} Mode", spec.mode), "Exit to Desktop Mode"),
        );
        let entries = vec![(Mode::normal(), entry), (spec.mode.clone(), leave)];
        for (mode, s) in &entries {
            validate_shortcuts(&machine, mode, slice::from_ref(s))?;
        }
        Ok((machine, entries))
    }

    /// Register a single edge and the chord in `from` that fires it.
    pub fn register_mode_transition(&mut self, spec: TransitionSpec) -> Result<()> {
        let staged = self.stage_transition(&spec);
        let (machine, shortcut) = self.report("register_mode_transition", staged)?;
        *self.session.machine_mut() = machine;
        self.registry.register(&spec.from, vec![shortcut]);
        debug!(transition = %spec.name, from = %spec.from, to = %spec.to, "transition_registered");
        Ok(())
    }

    /// Build the machine and shortcut a transition registration would produce.
    fn stage_transition(&self, spec: &TransitionSpec) -> Result<(ModeMachine, Shortcut)> {
        let mut machine = self.session.machine().clone();
        machine.add_transition(Transition::new(
            spec.name.clone(),
            spec.from.clone(),
            spec.to.clone(),
        ))?;
        let shortcut = Shortcut::new(
            spec.chord.clone(),
            Callback::enter(spec.name.clone(), spec.callback.clone()),
            spec.shortcut_metadata(),
        );
        validate_shortcuts(&machine, &spec.from, slice::from_ref(&shortcut))?;
        Ok((machine, shortcut))
    }

    /// Rebind or unmap shortcuts by category/description or mode/entity name.
    ///
    /// Colliding chords are left in place and reported; lookup picks the one
    /// positioned later in the mode's list.
    pub fn remap(&mut self, table: &RemapTable) -> RemapReport {
        let report = self.registry.remap(table);
        debug!(
            remapped = report.remapped,
            unmapped = report.unmapped,
            unmatched = report.unmatched.len(),
            conflicts = report.conflicts.len(),
            "remap_applied"
        );
        report
    }

    /// Load the baseline shortcuts, filtered by `options`.
    pub fn use_default_config(
        &mut self,
        defaults: &DefaultConfig,
        options: &FilterOptions,
    ) -> Result<MergeStats> {
        let applied = defaults
            .apply(&mut self.registry, self.session.machine(), options)
            .map_err(Error::from);
        self.report("use_default_config", applied)
    }

    /// The active mode.
    pub fn mode(&self) -> &Mode {
        self.session.mode()
    }

    /// Workflow history since the last desktop entry.
    pub fn history(&self) -> &WorkflowHistory {
        self.session.history()
    }

    /// The session handed to handlers.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access, e.g. to fire transitions from the host.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Registered shortcuts.
    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }
}
