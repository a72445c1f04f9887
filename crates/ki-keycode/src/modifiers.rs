use std::{collections::BTreeSet, convert::TryFrom, fmt};

use crate::Key;

/// Modifier keys that participate in shortcut matching.
///
/// Declaration order is the canonical order used when a modifier set is
/// rendered or normalized: Command, Option, Control, Shift, Function.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Modifier {
    Command,
    Option,
    Control,
    Shift,
    Function,
}

impl From<Modifier> for Key {
    fn from(m: Modifier) -> Self {
        match m {
            Modifier::Command => Self::Command,
            Modifier::Option => Self::Option,
            Modifier::Control => Self::Control,
            Modifier::Shift => Self::Shift,
            Modifier::Function => Self::Function,
        }
    }
}

impl TryFrom<Key> for Modifier {
    type Error = ();
    fn try_from(k: Key) -> Result<Self, Self::Error> {
        match k {
            Key::Command | Key::RightCommand => Ok(Self::Command),
            Key::Option | Key::RightOption => Ok(Self::Option),
            Key::Control | Key::RightControl => Ok(Self::Control),
            Key::Shift | Key::RightShift => Ok(Self::Shift),
            Key::Function => Ok(Self::Function),
            _ => Err(()),
        }
    }
}

impl Modifier {
    /// Every modifier, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Command,
        Self::Option,
        Self::Control,
        Self::Shift,
        Self::Function,
    ];

    /// Parses a modifier specification string via key specs, then converts.
    ///
    /// Accepts case-insensitive names and the usual aliases
    /// (cmd/ctrl/opt/alt/shift/fn). If the parsed key is not a modifier,
    /// parsing fails.
    pub fn from_spec(s: &str) -> Option<Self> {
        Key::from_spec(s).and_then(|k| Self::try_from(k).ok())
    }

    /// Returns the canonical spec string for this modifier.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Command => "cmd",
            Self::Option => "opt",
            Self::Control => "ctrl",
            Self::Shift => "shift",
            Self::Function => "fn",
        }
    }

    /// CGEventFlags mask bit for this modifier.
    fn cg_mask(self) -> u64 {
        match self {
            Self::Shift => 1 << 17,
            Self::Control => 1 << 18,
            Self::Option => 1 << 19,
            Self::Command => 1 << 20,
            Self::Function => 1 << 23,
        }
    }
}

/// The exact set of modifiers held for a key event or required by a shortcut.
///
/// Equality is exact-set equality: `{cmd}` and `{cmd, shift}` are different
/// sets and never match each other.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Modifiers(BTreeSet<Modifier>);

impl Modifiers {
    /// The empty modifier set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a modifier set from macOS CGEventFlags bits.
    ///
    /// Only the primary device-independent bits are considered:
    /// shift (1 << 17), control (1 << 18), option (1 << 19),
    /// command (1 << 20) and secondary fn (1 << 23).
    pub fn from_cg_flags(flags: u64) -> Self {
        Modifier::ALL
            .into_iter()
            .filter(|m| flags & m.cg_mask() != 0)
            .collect()
    }

    /// Parse a list of modifier names, e.g. `["cmd", "shift"]`.
    pub fn parse<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut out = Self::new();
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return None;
            }
            out.insert(Modifier::from_spec(trimmed)?);
        }
        Some(out)
    }

    /// Add a modifier; returns false if it was already present.
    pub fn insert(&mut self, m: Modifier) -> bool {
        self.0.insert(m)
    }

    /// Whether `m` is part of this set.
    pub fn contains(&self, m: Modifier) -> bool {
        self.0.contains(&m)
    }

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of modifiers in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate modifiers in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }

    /// Canonical spec names in canonical order.
    pub fn to_specs(&self) -> Vec<&'static str> {
        self.iter().map(Modifier::to_spec).collect()
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<T: IntoIterator<Item = Modifier>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Modifier; N]> for Modifiers {
    fn from(mods: [Modifier; N]) -> Self {
        mods.into_iter().collect()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_specs().join("+"))
    }
}
