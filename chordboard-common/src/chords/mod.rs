//! Chord inference core
//!
//! Turns the timed note events of one recording into a short chord-name
//! sequence: notes are bucketed into fixed time windows, each window's pitch
//! classes are ranked by frequency, and the top classes are matched against a
//! fixed table of triad and seventh-chord templates.

pub mod engine;
pub mod note;
pub mod templates;

pub use engine::{infer_chords, resolve, ChordEngineConfig};
pub use note::{note_name, pitch_class, NoteEvent, NOTE_NAMES};
