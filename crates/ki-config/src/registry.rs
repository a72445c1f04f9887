//! Per-mode shortcut lists: merge, lookup and validation.

use std::collections::{BTreeMap, HashMap};

use ki_keycode::Chord;
use ki_mode::{Mode, ModeMachine};
use tracing::debug;

use crate::{Error, RemapReport, RemapTable, Shortcut, remap};

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Incoming shortcuts that overwrote an existing slot.
    pub replaced: usize,
    /// Incoming shortcuts appended to the end.
    pub appended: usize,
}

impl MergeStats {
    /// Add another merge's counts to this one.
    pub fn absorb(&mut self, other: Self) {
        self.replaced += other.replaced;
        self.appended += other.appended;
    }
}

/// Merge `from` into `to`.
///
/// A shortcut in `from` whose chord already exists in `to` overwrites that
/// slot in place, so display order of untouched entries is preserved. New
/// chords are appended. When `to` already holds duplicates, the slot
/// positioned last is the one overwritten.
pub fn merge_shortcuts(from: Vec<Shortcut>, to: &mut Vec<Shortcut>) -> MergeStats {
    let mut index: HashMap<Chord, usize> = to
        .iter()
        .enumerate()
        .map(|(i, s)| (s.chord().clone(), i))
        .collect();
    let mut stats = MergeStats::default();
    for s in from {
        match index.get(s.chord()) {
            Some(&i) => {
                to[i] = s;
                stats.replaced += 1;
            }
            None => {
                index.insert(s.chord().clone(), to.len());
                to.push(s);
                stats.appended += 1;
            }
        }
    }
    stats
}

/// Check that `shortcuts` can be registered into `mode`.
///
/// The mode must be a registered state, and every transition shortcut must
/// name an edge that leaves `mode`.
pub fn validate_shortcuts(
    machine: &ModeMachine,
    mode: &Mode,
    shortcuts: &[Shortcut],
) -> Result<(), Error> {
    if !machine.has_state(mode) {
        return Err(Error::UnknownMode {
            mode: mode.to_string(),
        });
    }
    for s in shortcuts {
        if let Some(t) = s.handler().transition()
            && !machine.leaves(t, mode)
        {
            return Err(Error::UnknownTransition {
                mode: mode.to_string(),
                chord: s.chord().to_string(),
                transition: t.to_string(),
            });
        }
    }
    Ok(())
}

/// Mapping from mode to its ordered shortcut list.
#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    modes: BTreeMap<Mode, Vec<Shortcut>>,
}

impl ShortcutRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `shortcuts` into the list for `mode` (see [`merge_shortcuts`]).
    ///
    /// Does not validate; callers check with [`validate_shortcuts`] first.
    pub fn register(&mut self, mode: &Mode, shortcuts: Vec<Shortcut>) -> MergeStats {
        let list = self.modes.entry(mode.clone()).or_default();
        let stats = merge_shortcuts(shortcuts, list);
        debug!(
            mode = %mode,
            replaced = stats.replaced,
            appended = stats.appended,
            "shortcuts_registered"
        );
        stats
    }

    /// The shortcut list for `mode`, in display order.
    pub fn shortcuts(&self, mode: &Mode) -> &[Shortcut] {
        self.modes.get(mode).map(Vec::as_slice).unwrap_or_default()
    }

    /// Exact-match lookup. If the list holds duplicates, the entry
    /// positioned last wins.
    pub fn lookup(&self, mode: &Mode, chord: &Chord) -> Option<&Shortcut> {
        self.shortcuts(mode).iter().rev().find(|s| s.chord() == chord)
    }

    /// Modes that have at least one list, in name order.
    pub fn modes(&self) -> impl Iterator<Item = &Mode> {
        self.modes.keys()
    }

    /// All `(mode, list)` pairs in mode-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Mode, &[Shortcut])> {
        self.modes.iter().map(|(m, l)| (m, l.as_slice()))
    }

    /// Total number of shortcuts across all modes.
    pub fn len(&self) -> usize {
        self.modes.values().map(Vec::len).sum()
    }

    /// True when no shortcut is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebind or unmap shortcuts according to `table`.
    pub fn remap(&mut self, table: &RemapTable) -> RemapReport {
        remap::apply(&mut self.modes, table)
    }
}
