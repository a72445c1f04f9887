//! Mode names and transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transition from desktop (or entity) into normal mode.
pub const ENTER_NORMAL_MODE: &str = "enterNormalMode";
/// Transition from normal into entity mode.
pub const ENTER_ENTITY_MODE: &str = "enterEntityMode";
/// Transition from any non-desktop mode back to desktop.
pub const EXIT_MODE: &str = "exitMode";

/// A named state restricting which shortcuts are active.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(String);

impl Mode {
    /// Name of the initial, idle mode.
    pub const DESKTOP: &'static str = "desktop";
    /// Name of the mode entered from the desktop entry shortcut.
    pub const NORMAL: &'static str = "normal";
    /// Name of the mode used to pick an entity for a pending action.
    pub const ENTITY: &'static str = "entity";

    /// A mode with an arbitrary name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The desktop mode.
    pub fn desktop() -> Self {
        Self::new(Self::DESKTOP)
    }

    /// The normal mode.
    pub fn normal() -> Self {
        Self::new(Self::NORMAL)
    }

    /// The entity mode.
    pub fn entity() -> Self {
        Self::new(Self::ENTITY)
    }

    /// The mode name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the desktop mode.
    pub fn is_desktop(&self) -> bool {
        self.0 == Self::DESKTOP
    }

    /// True for the normal mode.
    pub fn is_normal(&self) -> bool {
        self.0 == Self::NORMAL
    }

    /// True for the built-in modes and the empty name, which custom mode
    /// registration may not claim.
    pub fn is_reserved(&self) -> bool {
        matches!(self.0.as_str(), "" | Self::DESKTOP | Self::NORMAL | Self::ENTITY)
    }

    /// Default name of the transition that enters this mode from normal mode,
    /// e.g. `volume` -> `enterVolumeMode`.
    pub fn enter_transition_name(&self) -> String {
        let mut chars = self.0.chars();
        let capitalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("enter{}Mode", capitalized)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Mode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Mode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named directed edge between two modes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// Event name used to fire the transition.
    pub name: String,
    /// Source mode.
    pub from: Mode,
    /// Target mode.
    pub to: Mode,
}

impl Transition {
    /// Build a transition.
    pub fn new(name: impl Into<String>, from: impl Into<Mode>, to: impl Into<Mode>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// The built-in transitions between desktop, normal and entity modes.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(ENTER_NORMAL_MODE, Mode::DESKTOP, Mode::NORMAL),
            Self::new(ENTER_NORMAL_MODE, Mode::ENTITY, Mode::NORMAL),
            Self::new(ENTER_ENTITY_MODE, Mode::NORMAL, Mode::ENTITY),
            Self::new(EXIT_MODE, Mode::NORMAL, Mode::DESKTOP),
            Self::new(EXIT_MODE, Mode::ENTITY, Mode::DESKTOP),
        ]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.from, self.to)
    }
}
