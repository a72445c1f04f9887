//! Shortcut configuration for ki.
//!
//! A [`Shortcut`] pairs a [`Chord`](ki_keycode::Chord) with a [`Handler`]
//! and display [`Metadata`]. The [`ShortcutRegistry`] keeps one ordered list
//! per mode and supports merge-with-override, exact lookup and remapping by
//! category/description or by mode/entity name. [`DefaultConfig`] supplies
//! the baseline mode-management shortcuts plus include/exclude filtering of
//! entity shortcuts.

mod defaults;
mod error;
mod loader;
mod registry;
mod remap;
mod shortcut;

#[cfg(test)]
mod test_remap;

pub use defaults::{DefaultConfig, Filter, FilterOptions};
pub use error::Error;
pub use loader::{parse_chord, parse_filter, parse_remap};
pub use registry::{MergeStats, ShortcutRegistry, merge_shortcuts, validate_shortcuts};
pub use remap::{Binding, RemapConflict, RemapReport, RemapTable};
pub use shortcut::{
    Callback, CallbackFn, EntityAction, Handler, Metadata, Shortcut, TransitionCallback,
};
