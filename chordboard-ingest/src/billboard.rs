//! Billboard chart CSV
//!
//! Loads Billboard Hot 100 chart rows exported from the McGill corpus:
//! `song_id,song_title,artist,peak_position,year`. Rows missing an id or
//! title are skipped with a warning.

use std::path::Path;

use chordboard_common::Result;
use serde::Deserialize;
use tracing::warn;

/// Raw CSV row, named after the export's column headers.
#[derive(Debug, Deserialize)]
struct BillboardRecord {
    song_id: Option<i64>,
    song_title: String,
    artist: String,
    peak_position: Option<i64>,
    year: Option<i64>,
}

/// One cleaned chart row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub peak_position: Option<i64>,
    pub year: Option<i64>,
}

/// Load the Billboard chart CSV.
pub fn load_billboard_csv(path: &Path) -> Result<Vec<ChartRow>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| chordboard_common::Error::Parse(format!("{}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<BillboardRecord>().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed chart row {}: {}", line + 2, e);
                continue;
            }
        };

        let Some(song_id) = record.song_id else {
            warn!("Skipping chart row {}: no song_id", line + 2);
            continue;
        };
        if record.song_title.trim().is_empty() {
            warn!("Skipping chart row {}: empty title", line + 2);
            continue;
        }

        rows.push(ChartRow {
            song_id,
            title: record.song_title,
            artist: record.artist,
            peak_position: record.peak_position,
            year: record.year,
        });
    }

    Ok(rows)
}
