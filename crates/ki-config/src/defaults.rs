//! Baseline shortcut configuration and its include/exclude filters.

use std::collections::HashSet;

use ki_keycode::{Chord, Key, Modifier, Modifiers};
use ki_mode::{ENTER_ENTITY_MODE, ENTER_NORMAL_MODE, EXIT_MODE, Mode, ModeMachine};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Handler, MergeStats, Metadata, Shortcut, ShortcutRegistry, validate_shortcuts,
};

/// Filter options accepted by the default configuration.
///
/// At most one list may be given. Entries match a mode name, an entity
/// identifier or name, or the composite `mode.name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    /// Keep only the entity shortcuts matching one of these keys.
    pub include: Option<Vec<String>>,
    /// Drop the entity shortcuts matching one of these keys.
    pub exclude: Option<Vec<String>>,
}

impl FilterOptions {
    /// Keep only matching entity shortcuts.
    pub fn include<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Some(keys.into_iter().map(Into::into).collect()),
            exclude: None,
        }
    }

    /// Drop matching entity shortcuts.
    pub fn exclude<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: None,
            exclude: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    /// Build the filter, rejecting options that name both lists.
    pub fn filter(&self) -> Result<Filter, Error> {
        match (&self.include, &self.exclude) {
            (Some(_), Some(_)) => Err(Error::ConflictingFilters),
            (Some(keys), None) => Ok(Filter::Include(keys.iter().cloned().collect())),
            (None, Some(keys)) => Ok(Filter::Exclude(keys.iter().cloned().collect())),
            (None, None) => Ok(Filter::All),
        }
    }
}

/// A validated entity filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Keep every shortcut.
    All,
    /// Keep entity shortcuts matching a key.
    Include(HashSet<String>),
    /// Drop entity shortcuts matching a key.
    Exclude(HashSet<String>),
}

impl Filter {
    /// Whether `shortcut`, registered in `mode`, survives the filter.
    /// Shortcuts that are not backed by an entity always do.
    pub fn admits(&self, mode: &Mode, shortcut: &Shortcut) -> bool {
        let Some(entity) = shortcut.handler().as_entity() else {
            return true;
        };
        let (set, want) = match self {
            Self::All => return true,
            Self::Include(set) => (set, true),
            Self::Exclude(set) => (set, false),
        };
        let composite = format!("{}.{}", mode, entity.name());
        let hit = [mode.as_str(), entity.identifier(), entity.name(), composite.as_str()]
            .iter()
            .any(|k| set.contains(*k));
        hit == want
    }
}

/// Baseline mode-management shortcuts plus host-supplied entity lists.
#[derive(Debug, Clone)]
pub struct DefaultConfig {
    modes: Vec<(Mode, Vec<Shortcut>)>,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A transition shortcut.
fn enter(mods: &[Modifier], key: Key, event: &str, category: &str, description: &str) -> Shortcut {
    let modifiers: Modifiers = mods.iter().copied().collect();
    Shortcut::new(
        Chord::new(modifiers, key),
        Handler::enter(event),
        Metadata::new(category, description),
    )
}

impl DefaultConfig {
    /// The baseline: enter normal mode from desktop, move between normal and
    /// entity mode, and exit back to desktop.
    pub fn new() -> Self {
        use Modifier::Command;
        Self {
            modes: vec![
                (
                    Mode::desktop(),
                    vec![enter(
                        &[Command],
                        Key::Escape,
                        ENTER_NORMAL_MODE,
                        "Desktop Mode",
                        "Enter Normal Mode",
                    )],
                ),
                (
                    Mode::normal(),
                    vec![
                        enter(&[], Key::Escape, EXIT_MODE, "Normal Mode", "Exit to Desktop Mode"),
                        enter(
                            &[Command],
                            Key::E,
                            ENTER_ENTITY_MODE,
                            "Normal Mode",
                            "Enter Entity Mode",
                        ),
                    ],
                ),
                (
                    Mode::entity(),
                    vec![
                        enter(&[], Key::Escape, EXIT_MODE, "Entity Mode", "Exit to Desktop Mode"),
                        enter(
                            &[Command],
                            Key::Escape,
                            ENTER_NORMAL_MODE,
                            "Entity Mode",
                            "Enter Normal Mode",
                        ),
                    ],
                ),
            ],
        }
    }

    /// A configuration with no shortcuts at all.
    pub fn empty() -> Self {
        Self { modes: Vec::new() }
    }

    /// Add shortcuts for `mode`, after any already present.
    pub fn with_shortcuts(mut self, mode: impl Into<Mode>, shortcuts: Vec<Shortcut>) -> Self {
        let mode = mode.into();
        match self.modes.iter_mut().find(|(m, _)| *m == mode) {
            Some((_, list)) => list.extend(shortcuts),
            None => self.modes.push((mode, shortcuts)),
        }
        self
    }

    /// The configured lists, unfiltered.
    pub fn modes(&self) -> &[(Mode, Vec<Shortcut>)] {
        &self.modes
    }

    /// The lists that survive `options`.
    pub fn resolve(&self, options: &FilterOptions) -> Result<Vec<(Mode, Vec<Shortcut>)>, Error> {
        let filter = options.filter()?;
        Ok(self
            .modes
            .iter()
            .map(|(mode, list)| {
                let kept = list
                    .iter()
                    .filter(|s| filter.admits(mode, s))
                    .cloned()
                    .collect();
                (mode.clone(), kept)
            })
            .collect())
    }

    /// Filter, validate every list against `machine`, then merge into
    /// `registry`. Nothing is registered if any step fails.
    pub fn apply(
        &self,
        registry: &mut ShortcutRegistry,
        machine: &ModeMachine,
        options: &FilterOptions,
    ) -> Result<MergeStats, Error> {
        let resolved = self.resolve(options)?;
        for (mode, list) in &resolved {
            validate_shortcuts(machine, mode, list)?;
        }
        let mut stats = MergeStats::default();
        for (mode, list) in resolved {
            stats.absorb(registry.register(&mode, list));
        }
        debug!(
            replaced = stats.replaced,
            appended = stats.appended,
            "default_config_applied"
        );
        Ok(stats)
    }
}
