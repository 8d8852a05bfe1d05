//! BiMMuDa per-song metadata CSV
//!
//! Parses `metadata/bimmuda_per_song_metadata.csv` into clean song rows. Rows
//! without a usable year or chart position are skipped with a warning.

use std::path::Path;

use chordboard_common::Result;
use serde::Deserialize;
use tracing::warn;

/// Titles known to be instrumentals, which never carry lyric files.
const INSTRUMENTAL_TITLES: &[&str] = &[
    "Third Man Theme",
    "Blue Tango",
    "The Song from Moulin Rouge",
    "Cherry Pink and Apple Blossom White",
    "Autumn Leaves",
    "Lisbon Antigua",
    "Patricia",
    "The Theme from 'A Summer Place'",
    "Stranger on the Shore",
    "The Stripper",
    "Love is Blue",
    "Love's Theme",
    "Harlem Shake",
];

/// Raw CSV row, named after the dataset's column headers.
#[derive(Debug, Deserialize)]
struct SongRecord {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Artist")]
    artist: String,
    #[serde(rename = "Year")]
    year: Option<i64>,
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Genre (Broad 1)", default)]
    genre_broad: Option<String>,
    #[serde(rename = "Genre (Specific 1)", default)]
    genre_specific: Option<String>,
    #[serde(rename = "Time Signature 1", default)]
    time_signature: Option<String>,
    #[serde(rename = "Tonic 1", default)]
    tonic: Option<String>,
    #[serde(rename = "Mode 1", default)]
    mode: Option<String>,
    #[serde(rename = "BPM 1", default)]
    bpm: Option<f64>,
    #[serde(rename = "Link to Audio", default)]
    audio_link: Option<String>,
}

/// One cleaned metadata row, ready to upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct SongMeta {
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
    pub has_lyrics: bool,
    pub folder_path: String,
}

/// Load and clean the per-song metadata CSV.
///
/// `dataset_root` is the dataset checkout; the CSV lives at
/// `metadata/bimmuda_per_song_metadata.csv` and song folders at
/// `bimmuda_dataset/<year>/<position>`.
pub fn load_metadata(dataset_root: &Path) -> Result<Vec<SongMeta>> {
    let csv_path = dataset_root.join("metadata/bimmuda_per_song_metadata.csv");
    let mut reader = csv::Reader::from_path(&csv_path).map_err(|e| {
        chordboard_common::Error::Parse(format!("{}: {}", csv_path.display(), e))
    })?;

    let mut songs = Vec::new();
    for (line, record) in reader.deserialize::<SongRecord>().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed metadata row {}: {}", line + 2, e);
                continue;
            }
        };

        let Some(year) = record.year else {
            warn!("Skipping '{}': no year", record.title);
            continue;
        };
        let Some(position) = parse_position(&record.position) else {
            warn!(
                "Skipping '{}': unparseable position '{}'",
                record.title, record.position
            );
            continue;
        };

        let folder_path = format!("bimmuda_dataset/{}/{:02}", year, position);
        let has_lyrics = !INSTRUMENTAL_TITLES.contains(&record.title.as_str());

        songs.push(SongMeta {
            title: record.title,
            artist: record.artist,
            year,
            position,
            genre_broad: non_empty(record.genre_broad),
            genre_specific: non_empty(record.genre_specific),
            time_signature: non_empty(record.time_signature),
            tonic: non_empty(record.tonic),
            mode: non_empty(record.mode),
            bpm: record.bpm,
            audio_link: non_empty(record.audio_link),
            has_lyrics,
            folder_path,
        });
    }

    Ok(songs)
}

/// Take the first run of digits so positions like `"2a"` parse as 2.
fn parse_position(raw: &str) -> Option<i64> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
