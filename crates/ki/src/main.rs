//! Binary entrypoint for `ki`: replay or check a RON session script.
use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use ki_engine::{Engine, KeyDown, NullKeySource};
use ki_protocol::{UiMsg, ipc};
use serde::Serialize;
use tokio::{runtime::Builder, sync::mpsc};
use tracing::debug;

mod error;
mod script;

pub use error::Error;
use script::{ActionLog, ActionRecord, Script};

#[derive(Parser, Debug)]
#[command(name = "ki", about = "Modal keyboard automation engine", version)]
/// Command-line interface for the `ki` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Replay a session script through the engine and print what it produced.
    Replay {
        /// Path to the RON session script.
        path: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a session script, register it, and report problems.
    Check {
        /// Path to the RON session script.
        path: PathBuf,
    },
}

/// Everything a replay produced.
#[derive(Debug, Serialize)]
struct ReplayReport {
    /// Events fed to the engine.
    events: usize,
    /// Events the engine swallowed.
    swallowed: usize,
    /// Mode after the last event.
    final_mode: String,
    /// Entity actions, in order.
    actions: Vec<ActionRecord>,
    /// UI messages, in order.
    ui: Vec<UiMsg>,
    /// Chord collisions left by the remap, as `mode: chord (shadowed -> winner)`.
    conflicts: Vec<String>,
}

/// Build an engine with the script installed. Returns the remap conflicts.
fn build(
    script: &Script,
    ui_tx: ipc::UiTx,
    log: &ActionLog,
) -> Result<(Engine, Vec<String>), Error> {
    let mut engine = Engine::new(NullKeySource, ui_tx);
    let report = script.install(&mut engine, log)?;
    let conflicts = report
        .conflicts
        .iter()
        .map(|c| format!("{}: {} ({} -> {})", c.mode, c.chord, c.shadowed, c.winner))
        .collect();
    Ok((engine, conflicts))
}

/// Replay `script` on a current-thread runtime.
fn replay(script: &Script) -> Result<ReplayReport, Error> {
    let (ui_tx, mut ui_rx) = ipc::ui_channel();
    let log = ActionLog::default();
    let (mut engine, conflicts) = build(script, ui_tx, &log)?;

    let (tx, rx) = mpsc::unbounded_channel();
    for chord in &script.events {
        // The receiver outlives this loop, so sends cannot fail.
        tx.send(KeyDown::from_chord(chord)).ok();
    }
    drop(tx);

    let rt = Builder::new_current_thread().build()?;
    let summary = rt.block_on(engine.run(rx))?;
    debug!(?summary, "replay_finished");

    let mut ui = Vec::new();
    while let Ok(msg) = ui_rx.try_recv() {
        ui.push(msg);
    }
    let actions = log.lock().clone();
    Ok(ReplayReport {
        events: summary.events,
        swallowed: summary.swallowed,
        final_mode: engine.mode().to_string(),
        actions,
        ui,
        conflicts,
    })
}

/// Render a report as plain text.
fn print_report(report: &ReplayReport) {
    for msg in &report.ui {
        match msg {
            UiMsg::Status { mode, pending } => match pending {
                Some(p) => println!("status  {mode} (pending {p})"),
                None => println!("status  {mode}"),
            },
            UiMsg::Alert { sound } => println!("alert   {sound}"),
            UiMsg::Notify { kind, title, text } => println!("notify  {kind:?} {title}: {text}"),
        }
    }
    for a in &report.actions {
        let action = a.action.as_deref().unwrap_or("-");
        println!("action  {} in {} (pending {action})", a.entity, a.mode);
    }
    for c in &report.conflicts {
        println!("conflict {c}");
    }
    println!(
        "{} events, {} swallowed, final mode {}",
        report.events, report.swallowed, report.final_mode
    );
}

/// Run the selected command.
fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Replay { path, json } => {
            let script = Script::load(&path)?;
            let report = replay(&script)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Check { path } => {
            let script = Script::load(&path)?;
            let (ui_tx, _ui_rx) = ipc::ui_channel();
            let (engine, conflicts) = build(&script, ui_tx, &ActionLog::default())?;
            for c in &conflicts {
                println!("conflict {c}");
            }
            println!(
                "OK: {} shortcuts in {} modes",
                engine.registry().len(),
                engine.registry().modes().count()
            );
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);
    if let Err(e) = run(cli) {
        eprintln!("{e}");
        process::exit(1);
    }
}
