use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the ki engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid shortcut, remap or default-config input.
    #[error("Configuration error: {0}")]
    Config(#[from] ki_config::Error),

    /// The mode machine rejected a state or transition.
    #[error("Mode error: {0}")]
    Mode(#[from] ki_mode::ModeError),

    /// The key event source failed to attach.
    #[error("Key source error: {0}")]
    KeySource(String),
}
