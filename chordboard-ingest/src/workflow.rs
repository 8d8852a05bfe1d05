//! Ingest orchestration
//!
//! Runs the pipeline phases in order against one database. Each phase logs a
//! summary and individual failures are warnings, so a partial dataset still
//! produces a usable database.

use std::path::{Path, PathBuf};

use chordboard_common::chords::ChordEngineConfig;
use chordboard_common::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::matcher::{match_songs, ChartCandidate, MatchConfig};
use crate::scanner::MidiScanner;
use crate::{billboard, extract, mcgill, metadata, store};

/// What to ingest and from where.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Dataset checkout containing `metadata/` and `bimmuda_dataset/`
    pub dataset: PathBuf,
    /// Cap on the number of MIDI files processed
    pub limit: Option<usize>,
    pub skip_mcgill: bool,
    pub skip_billboard: bool,
}

/// Counts reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestReport {
    pub songs: usize,
    pub midi_files: usize,
    pub progressions: usize,
    pub mcgill_files: usize,
    pub billboard_entries: usize,
    pub matches: usize,
    pub backfilled: usize,
}

/// Run the full ingest pipeline.
pub async fn run(pool: &SqlitePool, options: &IngestOptions) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    report.songs = ingest_metadata(pool, &options.dataset).await?;
    let midi_files = ingest_midi_files(pool, &options.dataset, options.limit).await?;
    report.midi_files = midi_files.len();
    report.progressions = extract_progressions(pool, &midi_files).await?;

    if options.skip_mcgill {
        info!("Skipping McGill annotations");
    } else {
        report.mcgill_files = ingest_mcgill(pool, &options.dataset).await?;
    }

    if options.skip_billboard {
        info!("Skipping Billboard chart data");
    } else {
        let (entries, matches) = ingest_billboard(pool, &options.dataset).await?;
        report.billboard_entries = entries;
        report.matches = matches;
        if !options.skip_mcgill {
            report.backfilled = backfill_progressions(pool).await?;
        }
    }

    info!(
        songs = report.songs,
        midi_files = report.midi_files,
        progressions = report.progressions,
        mcgill_files = report.mcgill_files,
        billboard_entries = report.billboard_entries,
        matches = report.matches,
        backfilled = report.backfilled,
        "Ingest complete"
    );

    Ok(report)
}

/// Phase 1: song metadata CSV.
async fn ingest_metadata(pool: &SqlitePool, dataset: &Path) -> Result<usize> {
    let songs = metadata::load_metadata(dataset)?;
    for song in &songs {
        store::upsert_song(pool, song).await?;
    }
    info!("Loaded {} songs from metadata", songs.len());
    Ok(songs.len())
}

/// Phase 2: MIDI file discovery.
async fn ingest_midi_files(
    pool: &SqlitePool,
    dataset: &Path,
    limit: Option<usize>,
) -> Result<Vec<crate::scanner::MidiFile>> {
    let tree = dataset.join("bimmuda_dataset");
    if !tree.is_dir() {
        warn!("No bimmuda_dataset directory under {}", dataset.display());
        return Ok(Vec::new());
    }

    let mut files = MidiScanner::new()
        .scan(&tree)
        .map_err(|e| chordboard_common::Error::InvalidInput(e.to_string()))?;
    if let Some(limit) = limit {
        files.truncate(limit);
    }

    for file in &files {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !store::set_midi_file(pool, file.year, file.position, &name).await? {
            warn!(
                "No song row for {} ({}/{})",
                name, file.year, file.position
            );
        }
    }

    info!("Discovered {} full-arrangement MIDI files", files.len());
    Ok(files)
}

/// Phase 3: chord inference per MIDI file.
async fn extract_progressions(
    pool: &SqlitePool,
    files: &[crate::scanner::MidiFile],
) -> Result<usize> {
    let config = ChordEngineConfig::default();
    let mut stored = 0;

    for file in files {
        match extract::progression_for_file(&file.path, &config) {
            Ok(Some(progression)) => {
                if store::set_chord_progression(pool, file.year, file.position, &progression)
                    .await?
                {
                    stored += 1;
                }
            }
            Ok(None) => {
                tracing::debug!("No chords inferred for {}", file.path.display());
            }
            Err(e) => {
                warn!("Failed to extract chords from {}: {}", file.path.display(), e);
            }
        }
    }

    info!("Stored {} chord progressions", stored);
    Ok(stored)
}

/// Phase 4: McGill `.lab` annotations.
async fn ingest_mcgill(pool: &SqlitePool, dataset: &Path) -> Result<usize> {
    let dir = dataset.join("mcgill");
    if !dir.is_dir() {
        info!("No mcgill directory under {}, skipping", dataset.display());
        return Ok(0);
    }

    let files = mcgill::load_lab_files(&dir)?;
    for file in &files {
        store::replace_mcgill_chords(pool, file).await?;
    }

    info!("Loaded {} McGill annotation files", files.len());
    Ok(files.len())
}

/// Phase 5: Billboard chart rows plus song matching.
async fn ingest_billboard(pool: &SqlitePool, dataset: &Path) -> Result<(usize, usize)> {
    let csv_path = dataset.join("billboard.csv");
    if !csv_path.is_file() {
        info!("No billboard.csv under {}, skipping", dataset.display());
        return Ok((0, 0));
    }

    let rows = billboard::load_billboard_csv(&csv_path)?;
    for row in &rows {
        store::upsert_billboard_entry(pool, row).await?;
    }
    info!("Loaded {} Billboard chart entries", rows.len());

    let songs = store::fetch_song_candidates(pool).await?;
    let chart: Vec<ChartCandidate> = rows
        .iter()
        .map(|r| ChartCandidate {
            song_id: r.song_id,
            title: r.title.clone(),
            artist: r.artist.clone(),
        })
        .collect();

    let outcomes = match_songs(&songs, &chart, &MatchConfig::default());
    for outcome in &outcomes {
        store::upsert_match(pool, outcome).await?;
    }
    info!("Linked {} songs to chart entries", outcomes.len());

    Ok((rows.len(), outcomes.len()))
}

/// Phase 6: annotation backfill for songs with a chart link but no inferred
/// progression.
async fn backfill_progressions(pool: &SqlitePool) -> Result<usize> {
    let pending = store::fetch_unfilled_matches(pool).await?;
    let mut filled = 0;

    for (song_id, billboard_song_id) in pending {
        let labels = store::fetch_mcgill_simplified(pool, billboard_song_id).await?;
        if let Some(summary) = mcgill::summarize_labels(labels.iter().map(String::as_str)) {
            store::set_chord_progression_by_id(pool, song_id, &summary).await?;
            filled += 1;
        }
    }

    info!("Backfilled {} progressions from annotations", filled);
    Ok(filled)
}
