//! Remap tables: rebind or remove registered shortcuts by name.

use std::collections::{BTreeMap, BTreeSet};

use ki_keycode::Chord;
use ki_mode::Mode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Shortcut;

/// New binding for a remapped shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// Move the shortcut to this chord.
    #[serde(rename = "key")]
    Chord(Chord),
    /// Remove the shortcut.
    Unmap,
}

/// Two-level remap table.
///
/// The outer key is either a metadata category or a mode name; the inner
/// key is either a metadata description or an entity name. In RON:
/// `{"Entities": {"Spotify": key("s"), "Safari": unmap}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapTable {
    entries: BTreeMap<String, BTreeMap<String, Binding>>,
}

impl RemapTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebind `outer`/`inner` to `chord`.
    pub fn bind(mut self, outer: &str, inner: &str, chord: Chord) -> Self {
        self.insert(outer, inner, Binding::Chord(chord));
        self
    }

    /// Remove `outer`/`inner`.
    pub fn unmap(mut self, outer: &str, inner: &str) -> Self {
        self.insert(outer, inner, Binding::Unmap);
        self
    }

    /// Set the binding for `outer`/`inner`, replacing any previous one.
    pub fn insert(&mut self, outer: &str, inner: &str, binding: Binding) {
        self.entries
            .entry(outer.to_string())
            .or_default()
            .insert(inner.to_string(), binding);
    }

    /// The binding for `outer`/`inner`.
    pub fn get(&self, outer: &str, inner: &str) -> Option<&Binding> {
        self.entries.get(outer)?.get(inner)
    }

    /// All `(outer, inner, binding)` entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Binding)> {
        self.entries.iter().flat_map(|(o, inner)| {
            inner
                .iter()
                .map(move |(i, b)| (o.as_str(), i.as_str(), b))
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two shortcuts left on the same chord in one mode after a remap.
///
/// Both stay registered; lookup picks `winner`, the one positioned later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapConflict {
    /// Mode holding both shortcuts.
    pub mode: Mode,
    /// The shared chord.
    pub chord: Chord,
    /// Label of the shortcut that lookup no longer reaches.
    pub shadowed: String,
    /// Label of the shortcut that lookup returns.
    pub winner: String,
}

/// What a remap did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapReport {
    /// Shortcuts moved to a new chord.
    pub remapped: usize,
    /// Shortcuts removed.
    pub unmapped: usize,
    /// Table entries that matched no shortcut.
    pub unmatched: Vec<(String, String)>,
    /// Chord collisions introduced by rebinding.
    pub conflicts: Vec<RemapConflict>,
}

/// Label used in reports: the entity name, or the metadata description.
fn label(s: &Shortcut) -> String {
    s.entity_name()
        .unwrap_or(&s.metadata().description)
        .to_string()
}

/// Find the table entry for `s` registered in `mode`: metadata first, then
/// mode plus entity name.
fn entry_for<'a>(
    table: &'a RemapTable,
    mode: &Mode,
    s: &Shortcut,
) -> Option<(&'a str, &'a str, &'a Binding)> {
    let meta = s.metadata();
    let by_meta = table
        .entries
        .get_key_value(&meta.category)
        .and_then(|(o, inner)| inner.get_key_value(&meta.description).map(|(i, b)| (o, i, b)));
    let found = by_meta.or_else(|| {
        let name = s.entity_name()?;
        let (o, inner) = table.entries.get_key_value(mode.as_str())?;
        inner.get_key_value(name).map(|(i, b)| (o, i, b))
    })?;
    Some((found.0.as_str(), found.1.as_str(), found.2))
}

/// Apply `table` to every mode's list.
pub fn apply(modes: &mut BTreeMap<Mode, Vec<Shortcut>>, table: &RemapTable) -> RemapReport {
    let mut report = RemapReport::default();
    let mut matched: BTreeSet<(&str, &str)> = BTreeSet::new();

    for (mode, list) in modes.iter_mut() {
        let mut removed = vec![false; list.len()];
        let mut moved = vec![false; list.len()];
        for (i, slot) in list.iter_mut().enumerate() {
            let Some((outer, inner, binding)) = entry_for(table, mode, slot) else {
                continue;
            };
            matched.insert((outer, inner));
            match binding {
                Binding::Chord(chord) => {
                    debug!(mode = %mode, from = %slot.chord(), to = %chord, "shortcut_remapped");
                    *slot = slot.rebind(chord.clone());
                    moved[i] = true;
                    report.remapped += 1;
                }
                Binding::Unmap => {
                    debug!(mode = %mode, chord = %slot.chord(), "shortcut_unmapped");
                    removed[i] = true;
                    report.unmapped += 1;
                }
            }
        }

        for later in 0..list.len() {
            if removed[later] {
                continue;
            }
            for earlier in 0..later {
                if removed[earlier]
                    || !(moved[earlier] || moved[later])
                    || list[earlier].chord() != list[later].chord()
                {
                    continue;
                }
                let conflict = RemapConflict {
                    mode: mode.clone(),
                    chord: list[later].chord().clone(),
                    shadowed: label(&list[earlier]),
                    winner: label(&list[later]),
                };
                warn!(
                    mode = %conflict.mode,
                    chord = %conflict.chord,
                    shadowed = %conflict.shadowed,
                    winner = %conflict.winner,
                    "remap_conflict"
                );
                report.conflicts.push(conflict);
            }
        }

        let mut keep = removed.iter().map(|r| !r);
        list.retain(|_| keep.next().unwrap_or(true));
    }
    modes.retain(|_, list| !list.is_empty());

    report.unmatched = table
        .iter()
        .filter(|(o, i, _)| !matched.contains(&(*o, *i)))
        .map(|(o, i, _)| (o.to_string(), i.to_string()))
        .collect();
    report
}
