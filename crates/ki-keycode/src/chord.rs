use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Key, Modifiers};

/// A key chord: a set of modifiers plus a single key.
///
/// The canonical string form (modifiers in canonical order, then the key
/// name) is the shortcut identity used for merging and lookup.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Chord {
    /// Set of modifier keys held down for this chord.
    pub modifiers: Modifiers,
    /// The key for this chord.
    pub key: Key,
}

impl Chord {
    /// Build a chord from parts.
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// A chord with no modifiers.
    pub fn bare(key: Key) -> Self {
        Self::new(Modifiers::new(), key)
    }

    /// Parses a chord specification of the form "shift+opt+k".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is always the key spec.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_raw = parts.pop()?;
        // keep raw to allow a literal space
        let key = if key_raw == " " {
            Key::from_spec(" ")
        } else {
            Key::from_spec(key_raw.trim())
        }?;
        let modifiers = Modifiers::parse(parts)?;
        Some(Self { modifiers, key })
    }

    /// Returns the canonical string form of this chord.
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<&str> = self.modifiers.to_specs();
        out.push(self.key.to_spec());
        out.join("+")
    }
}

impl From<Key> for Chord {
    fn from(key: Key) -> Self {
        Self::bare(key)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid chord '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Modifier;

    #[test]
    fn parse_basic_chord() {
        let c = Chord::parse("shift+opt+k").expect("parse");
        assert!(c.modifiers.contains(Modifier::Shift));
        assert!(c.modifiers.contains(Modifier::Option));
        assert_eq!(c.key, Key::K);
        // Canonical order and lowercase specs
        assert_eq!(c.to_string(), "opt+shift+k");
    }

    #[test]
    fn digit_and_punct() {
        let c1 = Chord::parse("cmd+1").expect("parse");
        assert!(c1.modifiers.contains(Modifier::Command));
        assert_eq!(c1.key, Key::Digit1);
        assert_eq!(c1.to_string(), "cmd+1");

        let c2 = Chord::parse("ctrl+, ").expect("parse");
        assert_eq!(c2.key, Key::Comma);
        assert_eq!(c2.to_string(), "ctrl+,");

        let c3 = Chord::parse("shift+cmd+/").expect("parse");
        assert_eq!(c3.to_string(), "cmd+shift+/");
    }

    #[test]
    fn idempotence_roundtrip() {
        let inputs = ["shift+opt+k", "CTRL+ALT+Space", "Command+Digit1", "fn+pgdn", "cmd+escape"];
        for s in inputs {
            let c = Chord::parse(s).expect("parse");
            let spec = c.to_string();
            let c2 = Chord::parse(&spec).expect("reparse");
            assert_eq!(c, c2, "idempotent for {} => {}", s, spec);
        }
    }

    #[test]
    fn parse_no_modifiers_letter() {
        let c = Chord::parse("n").expect("parse");
        assert!(c.modifiers.is_empty());
        assert_eq!(c, Chord::bare(Key::N));
        assert_eq!(c.to_string(), "n");
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(Chord::parse("").is_none());
        assert!(Chord::parse("cmd+").is_none());
        assert!(Chord::parse("+k").is_none());
        assert!(Chord::parse("hyper+k").is_none());
    }

    #[test]
    fn serde_as_string() {
        let c: Chord = ron::from_str("\"cmd+shift+n\"").expect("deserialize");
        assert_eq!(c.to_string(), "cmd+shift+n");
        assert_eq!(ron::to_string(&c).expect("serialize"), "\"cmd+shift+n\"");
        assert!(ron::from_str::<Chord>("\"cmd+nope\"").is_err());
    }
}
