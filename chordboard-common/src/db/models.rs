//! Database models

use serde::{Deserialize, Serialize};

/// One BiMMuDa song with its metadata and inferred chord progression.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: i64,
    pub position: i64,
    pub genre_broad: Option<String>,
    pub genre_specific: Option<String>,
    pub time_signature: Option<String>,
    pub tonic: Option<String>,
    pub mode: Option<String>,
    pub bpm: Option<f64>,
    pub audio_link: Option<String>,
    pub has_midi_files: bool,
    pub has_lyrics: bool,
    pub folder_path: Option<String>,
    pub midi_file: Option<String>,
    /// Chord tokens joined with " - ", e.g. "C - G - Am - F"
    pub chord_progression: Option<String>,
}

/// Trimmed-down song row for list and search views.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongSummary {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: i64,
    pub position: i64,
    pub chord_progression: Option<String>,
}

/// Per-decade rollup for the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DecadeSummary {
    pub decade: i64,
    pub song_count: i64,
    pub with_chords: i64,
    pub first_year: i64,
    pub last_year: i64,
}

/// One Billboard chart row from the McGill dataset.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BillboardEntry {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub peak_position: Option<i64>,
    pub year: Option<i64>,
}

/// Link between a BiMMuDa song and a Billboard entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongMatch {
    pub id: i64,
    pub song_id: i64,
    pub billboard_song_id: i64,
    /// "exact" or "fuzzy"
    pub match_type: String,
    pub confidence: f64,
}

/// One annotation line from a McGill `.lab` chord file.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct McgillChord {
    pub id: i64,
    pub song_filename: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub chord_label: String,
    pub chord_simplified: String,
}
