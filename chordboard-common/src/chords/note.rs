//! Note events and pitch classes

use serde::{Deserialize, Serialize};

/// Note names indexed by pitch class (sharp spelling).
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One played note from a source recording.
///
/// Events are read-only inputs to the chord engine; timing is in seconds and
/// `end > start` is assumed to have been enforced by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// Onset time in seconds
    pub start: f64,
    /// Offset time in seconds
    pub end: f64,
    /// Percussive events are excluded from harmonic analysis
    pub is_percussive: bool,
}

impl NoteEvent {
    /// Create a non-percussive note event.
    pub fn new(pitch: u8, start: f64, end: f64) -> Self {
        Self {
            pitch,
            start,
            end,
            is_percussive: false,
        }
    }

    /// Pitch class of this note (pitch mod 12).
    pub fn pitch_class(&self) -> u8 {
        pitch_class(self.pitch)
    }
}

/// Reduce a MIDI pitch to its pitch class, discarding octave information.
pub fn pitch_class(pitch: u8) -> u8 {
    pitch % 12
}

/// Note name for a pitch class (0 = C, 11 = B).
pub fn note_name(pc: u8) -> &'static str {
    NOTE_NAMES[(pc % 12) as usize]
}
