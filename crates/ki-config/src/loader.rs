//! RON input forms: chords, remap tables and default-config filters.

use ki_keycode::Chord;
use serde::de::DeserializeOwned;

use crate::{Error, FilterOptions, RemapTable};

/// Decode `input` as `T`, labelling failures with `what`.
fn parse<T: DeserializeOwned>(what: &'static str, input: &str) -> Result<T, Error> {
    ron::from_str(input).map_err(|e| Error::Parse {
        what,
        message: e.to_string(),
    })
}

/// Parse a chord string such as `"cmd+shift+n"`.
pub fn parse_chord(spec: &str) -> Result<Chord, Error> {
    Chord::parse(spec).ok_or_else(|| Error::InvalidChord {
        spec: spec.to_string(),
    })
}

/// Parse a remap table, e.g. `{"Entities": {"Spotify": key("s")}}`.
pub fn parse_remap(input: &str) -> Result<RemapTable, Error> {
    parse("remap table", input)
}

/// Parse default-config filter options, e.g. `(include: Some(["Safari"]))`.
pub fn parse_filter(input: &str) -> Result<FilterOptions, Error> {
    parse("filter options", input)
}
