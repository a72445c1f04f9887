//! The `Key` enum and the keycode-to-name table.

/// Declares `Key` together with its hardware code and canonical spec name.
///
/// Each row is `Variant = code => "spec"`. The spec string is the lowercase
/// key name emitted by `Key::to_spec` and reported for incoming key events.
macro_rules! key_table {
    ( $( $variant:ident = $code:literal => $spec:literal, )* ) => {
        /// macOS virtual key, valued with its `kVK_*` hardware code.
        #[repr(u16)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[allow(missing_docs)]
        pub enum Key {
            $( $variant = $code, )*
        }

        impl Key {
            /// Every key in the table, in keycode declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )* ];

            /// Returns the canonical name for this key (the enum variant string).
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )*
                }
            }

            /// Looks up a `Key` from a hardware virtual keycode (HIToolbox kVK value).
            pub fn from_keycode(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// The hardware keycode for this key.
            pub fn keycode(self) -> u16 {
                self as u16
            }

            /// Canonical key name, as reported for key events.
            pub(crate) fn canonical(self) -> &'static str {
                match self {
                    $( Self::$variant => $spec, )*
                }
            }

            /// Exact lookup by canonical key name.
            pub(crate) fn from_canonical(s: &str) -> Option<Self> {
                match s {
                    $( $spec => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

key_table! {
    A = 0x00 => "a",
    S = 0x01 => "s",
    D = 0x02 => "d",
    F = 0x03 => "f",
    H = 0x04 => "h",
    G = 0x05 => "g",
    Z = 0x06 => "z",
    X = 0x07 => "x",
    C = 0x08 => "c",
    V = 0x09 => "v",
    B = 0x0B => "b",
    Q = 0x0C => "q",
    W = 0x0D => "w",
    E = 0x0E => "e",
    R = 0x0F => "r",
    Y = 0x10 => "y",
    T = 0x11 => "t",
    Digit1 = 0x12 => "1",
    Digit2 = 0x13 => "2",
    Digit3 = 0x14 => "3",
    Digit4 = 0x15 => "4",
    Digit6 = 0x16 => "6",
    Digit5 = 0x17 => "5",
    Equal = 0x18 => "=",
    Digit9 = 0x19 => "9",
    Digit7 = 0x1A => "7",
    Minus = 0x1B => "-",
    Digit8 = 0x1C => "8",
    Digit0 = 0x1D => "0",
    RightBracket = 0x1E => "]",
    O = 0x1F => "o",
    U = 0x20 => "u",
    LeftBracket = 0x21 => "[",
    I = 0x22 => "i",
    P = 0x23 => "p",
    Return = 0x24 => "return",
    L = 0x25 => "l",
    J = 0x26 => "j",
    Quote = 0x27 => "'",
    K = 0x28 => "k",
    Semicolon = 0x29 => ";",
    Backslash = 0x2A => "\\",
    Comma = 0x2B => ",",
    Slash = 0x2C => "/",
    N = 0x2D => "n",
    M = 0x2E => "m",
    Period = 0x2F => ".",
    Tab = 0x30 => "tab",
    Space = 0x31 => "space",
    Grave = 0x32 => "`",
    Delete = 0x33 => "delete",
    Escape = 0x35 => "escape",
    RightCommand = 0x36 => "rightcmd",
    Command = 0x37 => "cmd",
    Shift = 0x38 => "shift",
    CapsLock = 0x39 => "capslock",
    Option = 0x3A => "alt",
    Control = 0x3B => "ctrl",
    RightShift = 0x3C => "rightshift",
    RightOption = 0x3D => "rightalt",
    RightControl = 0x3E => "rightctrl",
    Function = 0x3F => "fn",
    F17 = 0x40 => "f17",
    KeypadDecimal = 0x41 => "pad.",
    KeypadMultiply = 0x43 => "pad*",
    KeypadPlus = 0x45 => "padplus",
    KeypadClear = 0x47 => "padclear",
    VolumeUp = 0x48 => "volumeup",
    VolumeDown = 0x49 => "volumedown",
    Mute = 0x4A => "mute",
    KeypadDivide = 0x4B => "pad/",
    KeypadEnter = 0x4C => "padenter",
    KeypadMinus = 0x4E => "pad-",
    F18 = 0x4F => "f18",
    F19 = 0x50 => "f19",
    KeypadEquals = 0x51 => "pad=",
    Keypad0 = 0x52 => "pad0",
    Keypad1 = 0x53 => "pad1",
    Keypad2 = 0x54 => "pad2",
    Keypad3 = 0x55 => "pad3",
    Keypad4 = 0x56 => "pad4",
    Keypad5 = 0x57 => "pad5",
    Keypad6 = 0x58 => "pad6",
    Keypad7 = 0x59 => "pad7",
    F20 = 0x5A => "f20",
    Keypad8 = 0x5B => "pad8",
    Keypad9 = 0x5C => "pad9",
    F5 = 0x60 => "f5",
    F6 = 0x61 => "f6",
    F7 = 0x62 => "f7",
    F3 = 0x63 => "f3",
    F8 = 0x64 => "f8",
    F9 = 0x65 => "f9",
    F11 = 0x67 => "f11",
    F13 = 0x69 => "f13",
    F16 = 0x6A => "f16",
    F14 = 0x6B => "f14",
    F10 = 0x6D => "f10",
    F12 = 0x6F => "f12",
    F15 = 0x71 => "f15",
    Help = 0x72 => "help",
    Home = 0x73 => "home",
    PageUp = 0x74 => "pageup",
    ForwardDelete = 0x75 => "forwarddelete",
    F4 = 0x76 => "f4",
    End = 0x77 => "end",
    F2 = 0x78 => "f2",
    PageDown = 0x79 => "pagedown",
    F1 = 0x7A => "f1",
    LeftArrow = 0x7B => "left",
    RightArrow = 0x7C => "right",
    DownArrow = 0x7D => "down",
    UpArrow = 0x7E => "up",
}

impl Key {
    /// Case-insensitive lookup of a `Key` from its variant name.
    ///
    /// Accepts strings like "Tab", "tab", or "TAB".
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// True for keys that act as modifiers (command, shift, option, ...).
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Command
                | Self::RightCommand
                | Self::Shift
                | Self::RightShift
                | Self::Option
                | Self::RightOption
                | Self::Control
                | Self::RightControl
                | Self::CapsLock
                | Self::Function
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keycodes_are_unique() {
        let mut seen = HashSet::new();
        for k in Key::ALL {
            assert!(seen.insert(k.keycode()), "duplicate keycode for {}", k.name());
        }
    }

    #[test]
    fn keycode_lookup() {
        assert_eq!(Key::from_keycode(0x2D), Some(Key::N));
        assert_eq!(Key::from_keycode(0x07), Some(Key::X));
        assert_eq!(Key::from_keycode(0x35), Some(Key::Escape));
        assert_eq!(Key::from_keycode(0x0A), None);
        for k in Key::ALL {
            assert_eq!(Key::from_keycode(k.keycode()), Some(*k));
        }
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        assert_eq!(Key::from_name("tab"), Some(Key::Tab));
        assert_eq!(Key::from_name("TAB"), Some(Key::Tab));
        assert_eq!(Key::from_name("Digit1"), Some(Key::Digit1));
        assert_eq!(Key::from_name("nope"), None);
    }
}
