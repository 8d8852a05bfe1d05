//! MIDI file parsing
//!
//! Converts a Standard MIDI File into the flat timed note list the chord
//! engine consumes. All tracks are merged; channel 10 (index 9) notes are kept
//! but flagged percussive so the engine can drop them.

use std::path::Path;

use chordboard_common::{Error, NoteEvent, Result};
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

/// Default tempo: 120 BPM in microseconds per beat.
const DEFAULT_TEMPO_US: f64 = 500_000.0;

/// MIDI percussion channel (0-indexed).
const DRUM_CHANNEL: u8 = 9;

/// Parse a MIDI file into note events with times in seconds.
pub fn parse_midi_file(path: &Path) -> Result<Vec<NoteEvent>> {
    let data = std::fs::read(path)?;
    parse_midi_bytes(&data)
        .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))
}

/// Parse SMF bytes into note events.
pub fn parse_midi_bytes(data: &[u8]) -> std::result::Result<Vec<NoteEvent>, midly::Error> {
    let smf = Smf::parse(data)?;
    let clock = TickClock::from_smf(&smf);

    let mut notes: Vec<NoteEvent> = Vec::new();

    // Active notes per (channel, pitch): the same pitch may sound on several
    // channels at once
    let mut active: std::collections::HashMap<(u8, u8), f64> = std::collections::HashMap::new();

    for track in &smf.tracks {
        let mut tick = 0u64;
        active.clear();

        for event in track {
            tick += event.delta.as_int() as u64;

            if let TrackEventKind::Midi { channel, message } = event.kind {
                let channel = channel.as_int();
                let time_s = clock.seconds_at(tick);
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        active.insert((channel, key.as_int()), time_s);
                    }
                    // Note-on with velocity 0 doubles as note-off
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        if let Some(start) = active.remove(&(channel, key.as_int())) {
                            push_note(&mut notes, channel, key.as_int(), start, time_s);
                        }
                    }
                    _ => {}
                }
            }
        }

        // Close notes left sounding at end of track
        let end_s = clock.seconds_at(tick);
        for ((channel, pitch), start) in active.drain() {
            push_note(&mut notes, channel, pitch, start, end_s);
        }
    }

    notes.sort_by(|a, b| a.start.total_cmp(&b.start));
    Ok(notes)
}

/// Converts absolute ticks to seconds.
///
/// Format-1 files keep the tempo map in the conductor track only, so tempo
/// events are collected from every track up front and applied globally rather
/// than per track.
enum TickClock {
    Metrical {
        ticks_per_beat: f64,
        /// (absolute tick, microseconds per beat), sorted by tick
        tempo_changes: Vec<(u64, f64)>,
    },
    /// Timecode ticks are wall-clock already; tempo events do not apply
    Timecode { ticks_per_sec: f64 },
}

impl TickClock {
    fn from_smf(smf: &Smf) -> Self {
        match smf.header.timing {
            midly::Timing::Metrical(tpb) => {
                let mut tempo_changes: Vec<(u64, f64)> = Vec::new();
                for track in &smf.tracks {
                    let mut tick = 0u64;
                    for event in track {
                        tick += event.delta.as_int() as u64;
                        if let TrackEventKind::Meta(MetaMessage::Tempo(t)) = event.kind {
                            tempo_changes.push((tick, t.as_int() as f64));
                        }
                    }
                }
                tempo_changes.sort_by_key(|&(tick, _)| tick);
                TickClock::Metrical {
                    ticks_per_beat: tpb.as_int() as f64,
                    tempo_changes,
                }
            }
            midly::Timing::Timecode(fps, subframes) => {
                let frames_per_sec = match fps {
                    midly::Fps::Fps24 => 24.0,
                    midly::Fps::Fps25 => 25.0,
                    midly::Fps::Fps29 => 29.97,
                    midly::Fps::Fps30 => 30.0,
                };
                TickClock::Timecode {
                    ticks_per_sec: frames_per_sec * subframes as f64,
                }
            }
        }
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            TickClock::Metrical {
                ticks_per_beat,
                tempo_changes,
            } => {
                let mut time_s = 0.0f64;
                let mut last_tick = 0u64;
                let mut tempo_us = DEFAULT_TEMPO_US;
                for &(change_tick, change_tempo) in tempo_changes {
                    if change_tick >= tick {
                        break;
                    }
                    time_s += ((change_tick - last_tick) as f64 / ticks_per_beat)
                        * (tempo_us / 1_000_000.0);
                    last_tick = change_tick;
                    tempo_us = change_tempo;
                }
                time_s + ((tick - last_tick) as f64 / ticks_per_beat) * (tempo_us / 1_000_000.0)
            }
            TickClock::Timecode { ticks_per_sec } => tick as f64 / ticks_per_sec,
        }
    }
}

fn push_note(notes: &mut Vec<NoteEvent>, channel: u8, pitch: u8, start: f64, end: f64) {
    // Zero-length notes carry no harmonic information
    if end <= start {
        return;
    }
    notes.push(NoteEvent {
        pitch,
        start,
        end,
        is_percussive: channel == DRUM_CHANNEL,
    });
}
