use thiserror::Error;

/// Errors raised by the mode state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ModeError {
    /// A mode was referenced that has not been registered as a state.
    #[error("Unknown mode '{mode}'")]
    UnknownMode { mode: String },

    /// A custom mode tried to take a built-in or empty name.
    #[error("Mode name '{mode}' is reserved")]
    ReservedMode { mode: String },

    /// No transition with this name exists at all.
    #[error("Unknown transition '{event}'")]
    UnknownTransition { event: String },

    /// The transition exists but not from the current mode.
    #[error("Transition '{event}' is not allowed from mode '{from}'")]
    InvalidTransition { event: String, from: String },

    /// The same (name, from) edge was declared with a different target.
    #[error(
        "Transition '{event}' from '{from}' already leads to '{existing}', cannot redirect it to '{requested}'"
    )]
    DuplicateTransition {
        event: String,
        from: String,
        existing: String,
        requested: String,
    },
}
