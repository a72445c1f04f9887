use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced by the `ki` binary.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the script or building the runtime failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The script is not valid RON for a session.
    #[error("{}: {message}", path.display())]
    Script {
        /// Script path.
        path: PathBuf,
        /// Decoder message with location.
        message: String,
    },

    /// Registration or dispatch failed.
    #[error(transparent)]
    Engine(#[from] ki_engine::Error),

    /// Output encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
