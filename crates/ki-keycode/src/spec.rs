use crate::Key;

// Aliases that only apply to parsing specs (not emitted by to_spec).
macro_rules! key_spec_aliases {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            // control/meta keys
            Command => "command",
            Command => "cmd",
            Control => "control",
            Option => "opt",
            Option => "option",
            CapsLock => "caps",
            Function => "function",

            // enter/return/delete variants
            Return => "enter",
            Return => "ret",
            Escape => "esc",
            Delete => "backspace",
            ForwardDelete => "del",
            Space => " ",

            // spelled-out punctuation
            Backslash => "backslash",
            Comma => "comma",
            Period => "period",
            Slash => "slash",
            Minus => "minus",
            Equal => "equal",
            Semicolon => "semicolon",
            Quote => "quote",
            Grave => "grave",
            LeftBracket => "leftbracket",
            RightBracket => "rightbracket",

            // navigation
            PageUp => "pgup",
            PageDown => "pgdn",
            KeypadEnter => "kpenter",
        }
    };
}

macro_rules! from_spec_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        match $s {
            $( $v => Some(Key::$k), )*
            _ => None,
        }
    }}
}

/// Parses a key specification into a `Key`.
///
/// Tries the canonical key name first ("n", "escape", "/"), then a
/// case-insensitive enum name (via `Key::from_name`), then the alias words
/// centrally defined in `key_spec_aliases`.
pub fn from_spec(s: &str) -> Option<Key> {
    if let Some(k) = Key::from_canonical(s) {
        return Some(k);
    }
    if let Some(k) = Key::from_name(s) {
        return Some(k);
    }
    if let some @ Some(_) = key_spec_aliases!(from_spec_match, s) {
        return some;
    }
    let lowered = s.to_ascii_lowercase();
    if let Some(k) = Key::from_canonical(&lowered) {
        return Some(k);
    }
    key_spec_aliases!(from_spec_match, lowered.as_str())
}

impl Key {
    /// Parses a key specification string into a `Key`.
    ///
    /// Accepts canonical names, enum variant names (case-insensitive), and
    /// common alias words such as esc, enter, ret, cmd, opt, pgup, pgdn.
    /// Returns `None` if no mapping matches.
    pub fn from_spec(s: &str) -> Option<Self> {
        from_spec(s)
    }

    /// Returns the canonical key name for this `Key`.
    ///
    /// Letters, digits and punctuation use their symbol ("a", "1", ","),
    /// other keys their lowercase name ("escape", "f5", "left").
    pub fn to_spec(self) -> &'static str {
        self.canonical()
    }
}
