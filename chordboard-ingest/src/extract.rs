//! Chord extraction
//!
//! Glue between the MIDI parser and the chord engine: one MIDI file in, one
//! progression string out.

use std::path::Path;

use chordboard_common::chords::{infer_chords, ChordEngineConfig};
use chordboard_common::Result;

use crate::midi::parse_midi_file;

/// Infer the chord progression for one MIDI file.
///
/// Returns `None` when the engine finds nothing to say (empty file, drums
/// only, too sparse), which is distinct from a parse failure.
pub fn progression_for_file(
    path: &Path,
    config: &ChordEngineConfig,
) -> Result<Option<String>> {
    let notes = parse_midi_file(path)?;
    let chords = infer_chords(&notes, config);

    if chords.is_empty() {
        Ok(None)
    } else {
        Ok(Some(chords.join(" - ")))
    }
}
