use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use ki_config::{
    DefaultConfig, EntityAction, FilterOptions, Handler, Metadata, Shortcut, parse_remap,
};
use ki_engine::{Engine, Error, KeyDown, MockKeySource, ModeSpec, RunSummary, TransitionSpec};
use ki_keycode::{Chord, Modifiers};
use ki_mode::{EXIT_MODE, Mode, WorkflowEvent};
use ki_protocol::{NotifyKind, UiMsg, ipc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Calls = Arc<Mutex<Vec<(Mode, Option<Chord>, Vec<WorkflowEvent>)>>>;

/// Entity that records every dispatch and answers with `exit`.
struct Recorder {
    name: &'static str,
    exit: Option<bool>,
    calls: Calls,
}

impl Recorder {
    fn new(name: &'static str, exit: Option<bool>) -> (Self, Calls) {
        let calls: Calls = Arc::default();
        (
            Self {
                name,
                exit,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl EntityAction for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn dispatch_action(
        &self,
        mode: &Mode,
        action: Option<&Chord>,
        workflow: &[WorkflowEvent],
    ) -> Option<bool> {
        self.calls
            .lock()
            .push((mode.clone(), action.cloned(), workflow.to_vec()));
        self.exit
    }
}

fn chord(s: &str) -> Chord {
    Chord::parse(s).unwrap()
}

fn key(s: &str) -> KeyDown {
    KeyDown::from_chord(&chord(s))
}

fn ev(mode: &str, c: &str) -> WorkflowEvent {
    WorkflowEvent {
        mode: Mode::new(mode),
        chord: chord(c),
    }
}

fn status(mode: &str, pending: Option<&str>) -> UiMsg {
    UiMsg::Status {
        mode: mode.into(),
        pending: pending.map(chord),
    }
}

fn drain(rx: &mut ipc::UiRx) -> Vec<UiMsg> {
    let mut out = Vec::new();
    while let Ok(m) = rx.try_recv() {
        out.push(m);
    }
    out
}

fn entity_shortcut(c: &str, entity: impl EntityAction + 'static, name: &str) -> Shortcut {
    Shortcut::new(chord(c), Handler::entity(entity), Metadata::new("Entities", name))
}

/// Engine with the baseline shortcuts loaded, not yet started.
fn engine() -> (Engine, MockKeySource, ipc::UiRx) {
    let (tx, rx) = ipc::ui_channel();
    let source = MockKeySource::new();
    let mut engine = Engine::new(source.clone(), tx);
    engine
        .use_default_config(&DefaultConfig::new(), &FilterOptions::default())
        .unwrap();
    (engine, source, rx)
}

#[test]
fn start_and_stop_drive_the_source() {
    let (mut engine, source, mut rx) = engine();
    assert!(!engine.is_running());
    engine.start().unwrap();
    assert!(engine.is_running());
    assert!(source.is_attached());
    assert_eq!(drain(&mut rx), vec![status("desktop", None)]);

    // Starting twice does not re-attach.
    engine.start().unwrap();
    assert_eq!(source.attach_count(), 1);

    engine.stop();
    assert!(!engine.is_running());
    assert!(!source.is_attached());
}

#[test]
fn failed_attach_leaves_engine_stopped() {
    let (mut engine, source, mut rx) = engine();
    source.fail_attach(true);
    assert!(matches!(engine.start(), Err(Error::KeySource(_))));
    assert!(!engine.is_running());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn matched_callback_receives_the_chord() {
    let (mut engine, _source, _rx) = engine();
    let seen: Arc<Mutex<Vec<Chord>>> = Arc::default();
    let seen2 = seen.clone();
    engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![Shortcut::new(
                chord("n"),
                Handler::callback(move |_, c| {
                    seen2.lock().push(c.clone());
                    None
                }),
                Metadata::new("File", "New"),
            )],
        )
        .unwrap();
    engine.start().unwrap();
    assert!(engine.handle_keydown(key("cmd+escape")));
    assert!(engine.mode().is_normal());

    assert!(engine.handle_keydown(key("n")));
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].modifiers.is_empty());
    assert_eq!(seen[0].to_string(), "n");
    assert!(engine.mode().is_normal());
}

#[test]
fn unmatched_key_in_normal_becomes_pending_action() {
    let (mut engine, _source, mut rx) = engine();
    engine.start().unwrap();
    engine.handle_keydown(key("cmd+escape"));
    drain(&mut rx);

    assert!(engine.handle_keydown(KeyDown::from_cg(1 << 20, 0x07)));
    assert_eq!(engine.mode(), &Mode::entity());
    assert_eq!(engine.history().action(), Some(&chord("cmd+x")));
    assert_eq!(
        engine.history().workflow(),
        &[ev("desktop", "cmd+escape"), ev("normal", "cmd+x")]
    );
    assert_eq!(drain(&mut rx), vec![status("entity", Some("cmd+x"))]);
}

#[test]
fn unmatched_key_in_entity_mode_alerts() {
    let (mut engine, _source, mut rx) = engine();
    engine.start().unwrap();
    engine.handle_keydown(key("cmd+escape"));
    engine.handle_keydown(key("cmd+x"));
    drain(&mut rx);
    let before = engine.history().clone();

    assert!(engine.handle_keydown(key("q")));
    assert_eq!(engine.mode(), &Mode::entity());
    assert_eq!(engine.history(), &before);
    assert_eq!(
        drain(&mut rx),
        vec![UiMsg::Alert {
            sound: "Funk".into()
        }]
    );
}

#[test]
fn entity_auto_exit_returns_to_desktop() {
    let (mut engine, _source, mut rx) = engine();
    let (safari, calls) = Recorder::new("Safari", Some(true));
    engine
        .register_shortcuts(Mode::ENTITY, vec![entity_shortcut("s", safari, "Safari")])
        .unwrap();
    engine.start().unwrap();
    for k in ["cmd+escape", "cmd+x", "s"] {
        assert!(engine.handle_keydown(key(k)));
    }

    assert!(engine.mode().is_desktop());
    assert!(engine.history().is_empty());
    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    let (mode, action, workflow) = &calls[0];
    assert_eq!(mode, &Mode::entity());
    assert_eq!(action.as_ref(), Some(&chord("cmd+x")));
    assert_eq!(
        workflow,
        &vec![
            ev("desktop", "cmd+escape"),
            ev("normal", "cmd+x"),
            ev("entity", "s"),
        ]
    );
    assert_eq!(
        drain(&mut rx),
        vec![
            status("desktop", None),
            status("normal", None),
            status("entity", Some("cmd+x")),
            status("desktop", None),
        ]
    );
}

#[test]
fn entity_without_exit_stays_in_mode() {
    let (mut engine, _source, _rx) = engine();
    let (mail, calls) = Recorder::new("Mail", None);
    engine
        .register_shortcuts(Mode::ENTITY, vec![entity_shortcut("m", mail, "Mail")])
        .unwrap();
    for k in ["cmd+escape", "cmd+e", "m"] {
        engine.handle_keydown(key(k));
    }
    assert_eq!(engine.mode(), &Mode::entity());
    assert_eq!(calls.lock()[0].1, None);
    assert_eq!(engine.history().workflow().len(), 3);
}

#[test]
fn callback_returning_true_exits() {
    let (mut engine, _source, _rx) = engine();
    engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![Shortcut::new(
                chord("t"),
                Handler::callback(|_, _| Some(true)),
                Metadata::default(),
            )],
        )
        .unwrap();
    engine.handle_keydown(key("cmd+escape"));
    assert!(engine.handle_keydown(key("t")));
    assert!(engine.mode().is_desktop());
    assert!(engine.history().is_empty());
}

#[test]
fn desktop_passthrough_changes_nothing() {
    let (mut engine, _source, mut rx) = engine();
    engine.start().unwrap();
    drain(&mut rx);
    let shortcuts = engine.registry().len();
    for k in ["a", "cmd+a", "shift+escape"] {
        assert!(!engine.handle_keydown(key(k)));
    }
    assert!(!engine.handle_keydown(KeyDown {
        modifiers: Modifiers::new(),
        keycode: 0xFFFF,
    }));
    assert!(engine.mode().is_desktop());
    assert!(engine.history().is_empty());
    assert_eq!(engine.registry().len(), shortcuts);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn unknown_keycode_outside_desktop_alerts() {
    let (mut engine, _source, mut rx) = engine();
    engine.handle_keydown(key("cmd+escape"));
    drain(&mut rx);
    assert!(engine.handle_keydown(KeyDown {
        modifiers: Modifiers::new(),
        keycode: 0xFFFF,
    }));
    assert!(engine.mode().is_normal());
    assert!(engine.history().action().is_none());
    assert_eq!(
        drain(&mut rx),
        vec![UiMsg::Alert {
            sound: "Funk".into()
        }]
    );
}

#[test]
fn modifier_matching_is_exact() {
    let (mut engine, _source, _rx) = engine();
    let hits = Arc::new(AtomicUsize::new(0));
    let h1 = hits.clone();
    let h2 = hits.clone();
    engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![
                Shortcut::new(
                    chord("cmd+k"),
                    Handler::callback(move |_, _| {
                        h1.fetch_add(1, Ordering::SeqCst);
                        None
                    }),
                    Metadata::default(),
                ),
                Shortcut::new(
                    chord("cmd+shift+j"),
                    Handler::callback(move |_, _| {
                        h2.fetch_add(1, Ordering::SeqCst);
                        None
                    }),
                    Metadata::default(),
                ),
            ],
        )
        .unwrap();

    engine.handle_keydown(key("cmd+escape"));
    engine.handle_keydown(key("cmd+shift+k"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(engine.history().action(), Some(&chord("cmd+shift+k")));

    engine.handle_keydown(key("cmd+escape"));
    engine.handle_keydown(key("cmd+j"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(engine.history().action(), Some(&chord("cmd+j")));

    engine.handle_keydown(key("cmd+escape"));
    engine.handle_keydown(key("cmd+k"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn later_registration_replaces_in_place() {
    let (mut engine, _source, _rx) = engine();
    let before = engine.registry().shortcuts(&Mode::normal()).len();
    let stats = engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![Shortcut::new(
                chord("escape"),
                Handler::callback(|_, _| None),
                Metadata::new("Normal Mode", "Stay"),
            )],
        )
        .unwrap();
    assert_eq!((stats.replaced, stats.appended), (1, 0));
    let list = engine.registry().shortcuts(&Mode::normal());
    assert_eq!(list.len(), before);
    assert_eq!(list[0].metadata().description, "Stay");

    let stats = engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![Shortcut::new(
                chord("z"),
                Handler::callback(|_, _| None),
                Metadata::default(),
            )],
        )
        .unwrap();
    assert_eq!((stats.replaced, stats.appended), (0, 1));
    assert_eq!(engine.registry().shortcuts(&Mode::normal()).len(), before + 1);
}

#[test]
fn invalid_registration_notifies_and_changes_nothing() {
    let (tx, mut rx) = ipc::ui_channel();
    let mut engine = Engine::new(MockKeySource::new(), tx);
    let err = engine
        .register_shortcuts(
            "volume",
            vec![Shortcut::new(
                chord("up"),
                Handler::callback(|_, _| None),
                Metadata::default(),
            )],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Config(ki_config::Error::UnknownMode { .. })));
    assert!(engine.registry().is_empty());

    let err = engine
        .register_shortcuts(
            Mode::DESKTOP,
            vec![Shortcut::new(chord("escape"), Handler::enter(EXIT_MODE), Metadata::default())],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ki_config::Error::UnknownTransition { .. })
    ));
    assert!(engine.registry().is_empty());

    let msgs = drain(&mut rx);
    assert_eq!(msgs.len(), 2);
    assert!(msgs.iter().all(|m| matches!(
        m,
        UiMsg::Notify { kind: NotifyKind::Error, title, .. } if title == "register_shortcuts"
    )));
}

#[test]
fn conflicting_filters_are_rejected() {
    let (tx, mut rx) = ipc::ui_channel();
    let mut engine = Engine::new(MockKeySource::new(), tx);
    let (safari, _) = Recorder::new("Safari", None);
    let defaults = DefaultConfig::new()
        .with_shortcuts(Mode::entity(), vec![entity_shortcut("s", safari, "Safari")]);
    let opts = FilterOptions {
        include: Some(vec!["Safari".into()]),
        exclude: Some(vec!["Mail".into()]),
    };
    let err = engine.use_default_config(&defaults, &opts).unwrap_err();
    assert!(matches!(err, Error::Config(ki_config::Error::ConflictingFilters)));
    assert!(engine.registry().is_empty());
    match drain(&mut rx).as_slice() {
        [UiMsg::Notify { kind, title, text }] => {
            assert_eq!(*kind, NotifyKind::Error);
            assert_eq!(title, "use_default_config");
            assert!(text.contains("include"));
        }
        other => panic!("unexpected messages: {other:?}"),
    }
}

#[test]
fn default_config_filters_entities() {
    let (tx, _rx) = ipc::ui_channel();
    let mut engine = Engine::new(MockKeySource::new(), tx);
    let (safari, _) = Recorder::new("Safari", None);
    let (mail, _) = Recorder::new("Mail", None);
    let defaults = DefaultConfig::new().with_shortcuts(
        Mode::entity(),
        vec![
            entity_shortcut("s", safari, "Safari"),
            entity_shortcut("m", mail, "Mail"),
        ],
    );
    engine
        .use_default_config(&defaults, &FilterOptions::exclude(["entity.Mail"]))
        .unwrap();
    let names: Vec<_> = engine
        .registry()
        .shortcuts(&Mode::entity())
        .iter()
        .filter_map(|s| s.entity_name())
        .collect();
    assert_eq!(names, vec!["Safari"]);
}

#[test]
fn remap_onto_occupied_key_resolves_to_later_slot() {
    let (mut engine, _source, _rx) = engine();
    let (safari, safari_calls) = Recorder::new("Safari", Some(true));
    let (spotify, spotify_calls) = Recorder::new("Spotify", Some(true));
    engine
        .register_shortcuts(
            Mode::ENTITY,
            vec![
                entity_shortcut("s", safari, "Safari"),
                entity_shortcut("p", spotify, "Spotify"),
            ],
        )
        .unwrap();

    let report = engine.remap(&parse_remap(r#"{"Entities": {"Spotify": key("s")}}"#).unwrap());
    assert_eq!(report.remapped, 1);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].shadowed, "Safari");
    assert_eq!(report.conflicts[0].winner, "Spotify");

    for k in ["cmd+escape", "cmd+x", "s"] {
        engine.handle_keydown(key(k));
    }
    assert_eq!(spotify_calls.lock().len(), 1);
    assert!(safari_calls.lock().is_empty());
    assert!(engine.mode().is_desktop());
}

#[test]
fn custom_mode_round_trip() {
    let (mut engine, _source, mut rx) = engine();
    let entered: Arc<Mutex<Vec<(Mode, Mode)>>> = Arc::default();
    let entered2 = entered.clone();
    engine
        .register_mode(ModeSpec::new("volume", chord("v")).on_enter(move |s, from, to| {
            assert_eq!(s.mode(), to);
            entered2.lock().push((from.clone(), to.clone()));
        }))
        .unwrap();
    let ups = Arc::new(AtomicUsize::new(0));
    let ups2 = ups.clone();
    engine
        .register_shortcuts(
            "volume",
            vec![Shortcut::new(
                chord("up"),
                Handler::callback(move |_, _| {
                    ups2.fetch_add(1, Ordering::SeqCst);
                    None
                }),
                Metadata::new("Volume", "Up"),
            )],
        )
        .unwrap();
    let entry = engine
        .registry()
        .lookup(&Mode::normal(), &chord("v"))
        .unwrap();
    assert_eq!(entry.handler().transition(), Some("enterVolumeMode"));
    assert_eq!(entry.metadata(), &Metadata::new("Normal Mode", "Enter volume Mode"));

    engine.start().unwrap();
    engine.handle_keydown(key("cmd+escape"));
    engine.handle_keydown(key("v"));
    assert_eq!(engine.mode(), &Mode::new("volume"));
    assert_eq!(entered.lock().as_slice(), &[(Mode::normal(), Mode::new("volume"))]);

    engine.handle_keydown(key("up"));
    engine.handle_keydown(key("up"));
    assert_eq!(ups.load(Ordering::SeqCst), 2);

    // Unmatched keys in a custom mode alert rather than capture an action.
    assert!(engine.handle_keydown(key("x")));
    assert!(engine.history().action().is_none());

    engine.handle_keydown(key("escape"));
    assert!(engine.mode().is_desktop());
    let msgs = drain(&mut rx);
    assert!(msgs.contains(&status("volume", None)));
    assert_eq!(msgs.last(), Some(&status("desktop", None)));
}

#[test]
fn register_mode_twice_is_harmless() {
    let (mut engine, _source, _rx) = engine();
    engine
        .register_mode(ModeSpec::new("volume", chord("v")))
        .unwrap();
    let edges = engine.session().machine().transitions().len();
    engine
        .register_mode(ModeSpec::new("volume", chord("v")))
        .unwrap();
    assert_eq!(engine.session().machine().transitions().len(), edges);
    assert_eq!(
        engine
            .registry()
            .shortcuts(&Mode::normal())
            .iter()
            .filter(|s| s.chord() == &chord("v"))
            .count(),
        1
    );
}

#[test]
fn auto_exit_uses_a_renamed_exit_edge() {
    let (mut engine, _source, mut rx) = engine();
    engine
        .register_mode(ModeSpec::new("volume", chord("v")).exit_transition("leaveVolumeMode"))
        .unwrap();
    engine
        .register_shortcuts(
            "volume",
            vec![Shortcut::new(
                chord("u"),
                Handler::callback(|_, _| Some(true)),
                Metadata::new("Volume", "Up and done"),
            )],
        )
        .unwrap();
    let leave = engine
        .registry()
        .lookup(&Mode::new("volume"), &chord("escape"))
        .unwrap();
    assert_eq!(leave.handler().transition(), Some("leaveVolumeMode"));

    engine.start().unwrap();
    for k in ["cmd+escape", "v", "u"] {
        assert!(engine.handle_keydown(key(k)));
    }
    assert!(engine.mode().is_desktop());
    assert!(engine.history().is_empty());
    assert_eq!(drain(&mut rx).last(), Some(&status("desktop", None)));
}

#[test]
fn builtin_and_empty_mode_names_are_reserved() {
    let (mut engine, _source, mut rx) = engine();
    let edges = engine.session().machine().transitions().len();
    let shortcuts = engine.registry().len();
    for name in [Mode::DESKTOP, Mode::NORMAL, Mode::ENTITY, ""] {
        let err = engine
            .register_mode(ModeSpec::new(name, chord("d")))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Mode(ki_mode::ModeError::ReservedMode { .. })
        ));
    }
    assert_eq!(engine.session().machine().transitions().len(), edges);
    assert_eq!(engine.registry().len(), shortcuts);
    let titles: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|m| match m {
            UiMsg::Notify { kind, title, .. } => {
                assert_eq!(kind, NotifyKind::Error);
                Some(title)
            }
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["register_mode"; 4]);

    // Desktop still passes escape through to the OS.
    engine.start().unwrap();
    assert!(!engine.handle_keydown(key("escape")));
    assert!(engine.mode().is_desktop());
}

#[test]
fn mode_transitions_register_edges_and_chords() {
    let (mut engine, _source, mut rx) = engine();
    engine
        .register_mode(ModeSpec::new("volume", chord("v")))
        .unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen2 = seen.clone();
    engine
        .register_mode_transition(
            TransitionSpec::new("enterVolumeMode", Mode::ENTITY, "volume", chord("cmd+v"))
                .on_enter(move |_, from, _| {
                    assert!(from == Mode::ENTITY);
                    seen2.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .unwrap();

    for k in ["cmd+escape", "cmd+e", "cmd+v"] {
        engine.handle_keydown(key(k));
    }
    assert_eq!(engine.mode(), &Mode::new("volume"));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    drain(&mut rx);

    // Unknown target mode: nothing changes.
    let edges = engine.session().machine().transitions().len();
    let shortcuts = engine.registry().len();
    let err = engine
        .register_mode_transition(TransitionSpec::new(
            "enterWarpMode",
            Mode::NORMAL,
            "warp",
            chord("w"),
        ))
        .unwrap_err();
    assert!(matches!(err, Error::Mode(ki_mode::ModeError::UnknownMode { .. })));

    // Redirecting an existing edge: nothing changes.
    let err = engine
        .register_mode_transition(TransitionSpec::new(
            EXIT_MODE,
            Mode::NORMAL,
            Mode::ENTITY,
            chord("q"),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Mode(ki_mode::ModeError::DuplicateTransition { .. })
    ));
    assert_eq!(engine.session().machine().transitions().len(), edges);
    assert_eq!(engine.registry().len(), shortcuts);

    let titles: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|m| match m {
            UiMsg::Notify { title, .. } => Some(title),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["register_mode_transition"; 2]);
}

#[test]
fn deferred_work_runs_before_next_event() {
    let (mut engine, _source, _rx) = engine();
    engine
        .register_shortcuts(
            Mode::NORMAL,
            vec![Shortcut::new(
                chord("d"),
                Handler::callback(|session, _| {
                    session.defer(|s| {
                        s.exit_mode().unwrap();
                    });
                    assert!(session.mode().is_normal());
                    assert_eq!(session.pending_tasks(), 1);
                    None
                }),
                Metadata::default(),
            )],
        )
        .unwrap();
    engine.handle_keydown(key("cmd+escape"));
    assert!(engine.handle_keydown(key("d")));
    assert!(engine.mode().is_desktop());
    assert_eq!(engine.session().pending_tasks(), 0);
    assert!(engine.history().is_empty());
}

#[tokio::test]
async fn run_loop_consumes_events_in_order() {
    let (mut engine, source, mut rx) = engine();
    let (tx, events) = mpsc::unbounded_channel();
    for k in ["a", "cmd+escape", "cmd+x", "q", "escape"] {
        tx.send(key(k)).unwrap();
    }
    drop(tx);

    let summary = engine.run(events).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            events: 5,
            swallowed: 4
        }
    );
    assert!(engine.mode().is_desktop());
    assert!(engine.history().is_empty());
    assert!(!engine.is_running());
    assert!(!source.is_attached());
    assert_eq!(source.attach_count(), 1);
    assert_eq!(
        drain(&mut rx),
        vec![
            status("desktop", None),
            status("normal", None),
            status("entity", Some("cmd+x")),
            UiMsg::Alert {
                sound: "Funk".into()
            },
            status("desktop", None),
        ]
    );
}
