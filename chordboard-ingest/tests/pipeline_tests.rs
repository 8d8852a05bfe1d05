//! End-to-end ingest pipeline tests
//!
//! Builds a miniature dataset on disk (metadata CSV, one generated MIDI file,
//! a McGill annotation, a Billboard chart CSV) and runs the full workflow
//! against an in-memory database.

use std::fs;
use std::path::Path;

use midly::{
    num::{u15, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

use chordboard_common::db::create_tables;
use chordboard_ingest::workflow::{run, IngestOptions};

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_tables(&pool).await.unwrap();
    pool
}

fn midi_event(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(channel),
            message,
        },
    }
}

/// Write a MIDI file holding a C major triad for four beats (2 seconds).
fn write_triad_midi(path: &Path) {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(480)),
    ));

    let mut track = Vec::new();
    for &key in &[60u8, 64, 67] {
        track.push(midi_event(
            0,
            0,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(90),
            },
        ));
    }
    for (i, &key) in [60u8, 64, 67].iter().enumerate() {
        track.push(midi_event(
            if i == 0 { 1920 } else { 0 },
            0,
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        ));
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Lay out a two-song dataset: one with MIDI, one reachable only through the
/// Billboard match and McGill annotations.
fn build_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    fs::create_dir_all(root.join("metadata")).unwrap();
    fs::write(
        root.join("metadata/bimmuda_per_song_metadata.csv"),
        "Title,Artist,Year,Position,Genre (Broad 1),Genre (Specific 1),Time Signature 1,Tonic 1,Mode 1,BPM 1,Link to Audio\n\
         Rock Around the Clock,Bill Haley & His Comets,1955,1,Rock,Rock & Roll,4/4,A,Major,180,\n\
         Sixteen Tons,Tennessee Ernie Ford,1955,2,Country,,4/4,E,Minor,80,\n",
    )
    .unwrap();

    write_triad_midi(&root.join("bimmuda_dataset/1955/01/1955_01_full.mid"));

    fs::create_dir_all(root.join("mcgill/0012")).unwrap();
    fs::write(
        root.join("mcgill/0012/majmin.lab"),
        "0.0 1.0 N\n1.0 2.0 E:min\n2.0 3.0 A:min\n3.0 4.0 B:7\n",
    )
    .unwrap();

    fs::write(
        root.join("billboard.csv"),
        "song_id,song_title,artist,peak_position,year\n\
         12,Sixteen Tons,Tennessee Ernie Ford,1,1955\n\
         99,Unrelated Song,Somebody Else,40,1957\n",
    )
    .unwrap();

    dir
}

#[tokio::test]
async fn full_pipeline_populates_all_tables() {
    let dataset = build_dataset();
    let pool = memory_pool().await;

    let options = IngestOptions {
        dataset: dataset.path().to_path_buf(),
        limit: None,
        skip_mcgill: false,
        skip_billboard: false,
    };
    let report = run(&pool, &options).await.expect("pipeline run");

    assert_eq!(report.songs, 2);
    assert_eq!(report.midi_files, 1);
    assert_eq!(report.progressions, 1);
    assert_eq!(report.mcgill_files, 1);
    assert_eq!(report.billboard_entries, 2);
    assert_eq!(report.matches, 1);
    assert_eq!(report.backfilled, 1);

    // MIDI song got an inferred progression
    let with_midi: (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT midi_file, chord_progression FROM songs WHERE year = 1955 AND position = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(with_midi.0.as_deref(), Some("1955_01_full.mid"));
    assert_eq!(with_midi.1.as_deref(), Some("C"));

    // Matched song got its progression backfilled from the annotation,
    // skipping the N marker
    let backfilled: Option<String> = sqlx::query_scalar(
        "SELECT chord_progression FROM songs WHERE year = 1955 AND position = 2",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(backfilled.as_deref(), Some("Em - Am - B7"));

    let match_type: String = sqlx::query_scalar("SELECT match_type FROM song_matches")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(match_type, "exact");
}

#[tokio::test]
async fn rerunning_the_pipeline_is_idempotent() {
    let dataset = build_dataset();
    let pool = memory_pool().await;

    let options = IngestOptions {
        dataset: dataset.path().to_path_buf(),
        limit: None,
        skip_mcgill: false,
        skip_billboard: false,
    };
    run(&pool, &options).await.unwrap();
    run(&pool, &options).await.unwrap();

    let songs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(&pool)
        .await
        .unwrap();
    let annotations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mcgill_chords")
        .fetch_one(&pool)
        .await
        .unwrap();
    let matches: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM song_matches")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(songs, 2);
    assert_eq!(annotations, 4);
    assert_eq!(matches, 1);
}

#[tokio::test]
async fn skip_flags_disable_their_phases() {
    let dataset = build_dataset();
    let pool = memory_pool().await;

    let options = IngestOptions {
        dataset: dataset.path().to_path_buf(),
        limit: None,
        skip_mcgill: true,
        skip_billboard: true,
    };
    let report = run(&pool, &options).await.unwrap();

    assert_eq!(report.mcgill_files, 0);
    assert_eq!(report.billboard_entries, 0);
    assert_eq!(report.matches, 0);
    assert_eq!(report.backfilled, 0);

    let annotations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mcgill_chords")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(annotations, 0);
}
