//! Error types for shortcut registration and configuration input.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while parsing or validating shortcut configuration.
pub enum Error {
    #[error("Could not parse {what}: {message}")]
    /// RON input could not be decoded.
    Parse {
        /// Which input form failed, e.g. "remap table".
        what: &'static str,
        /// Decoder message, including the location.
        message: String,
    },
    #[error("Cannot use both 'include' and 'exclude' filters")]
    /// Default-config filter options named both filter lists.
    ConflictingFilters,
    #[error("Mode '{mode}' is not registered")]
    /// Shortcuts were registered for a mode the machine does not know.
    UnknownMode {
        /// The offending mode.
        mode: String,
    },
    #[error("Shortcut '{chord}' in mode '{mode}' fires '{transition}', which does not leave '{mode}'")]
    /// A transition shortcut names an edge that cannot fire from its mode.
    UnknownTransition {
        /// Mode the shortcut was registered in.
        mode: String,
        /// Canonical chord of the shortcut.
        chord: String,
        /// Transition name carried by the handler.
        transition: String,
    },
    #[error("Invalid chord '{spec}'")]
    /// A chord string did not parse.
    InvalidChord {
        /// The raw chord string.
        spec: String,
    },
}
