//! Database writes for the ingest pipeline
//!
//! All phases funnel their results through these helpers so the SQL lives in
//! one place. Upserts key on the dataset's natural identifiers, which makes
//! every phase safe to re-run.

use chordboard_common::Result;
use sqlx::SqlitePool;

use crate::billboard::ChartRow;
use crate::matcher::{MatchOutcome, SongCandidate};
use crate::mcgill::LabFile;
use crate::metadata::SongMeta;

/// Insert or update a song row keyed on `(year, position)`.
pub async fn upsert_song(pool: &SqlitePool, song: &SongMeta) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs
            (title, artist, year, position, genre_broad, genre_specific,
             time_signature, tonic, mode, bpm, audio_link, has_lyrics, folder_path)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(year, position) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            genre_broad = excluded.genre_broad,
            genre_specific = excluded.genre_specific,
            time_signature = excluded.time_signature,
            tonic = excluded.tonic,
            mode = excluded.mode,
            bpm = excluded.bpm,
            audio_link = excluded.audio_link,
            has_lyrics = excluded.has_lyrics,
            folder_path = excluded.folder_path,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&song.title)
    .bind(&song.artist)
    .bind(song.year)
    .bind(song.position)
    .bind(&song.genre_broad)
    .bind(&song.genre_specific)
    .bind(&song.time_signature)
    .bind(&song.tonic)
    .bind(&song.mode)
    .bind(song.bpm)
    .bind(&song.audio_link)
    .bind(song.has_lyrics)
    .bind(&song.folder_path)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record a discovered MIDI file against its song. Returns false when no song
/// row exists for that `(year, position)`.
pub async fn set_midi_file(
    pool: &SqlitePool,
    year: i64,
    position: i64,
    midi_file: &str,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE songs SET midi_file = ?, has_midi_files = 1, updated_at = CURRENT_TIMESTAMP \
         WHERE year = ? AND position = ?",
    )
    .bind(midi_file)
    .bind(year)
    .bind(position)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Store an inferred chord progression for a song.
pub async fn set_chord_progression(
    pool: &SqlitePool,
    year: i64,
    position: i64,
    progression: &str,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE songs SET chord_progression = ?, updated_at = CURRENT_TIMESTAMP \
         WHERE year = ? AND position = ?",
    )
    .bind(progression)
    .bind(year)
    .bind(position)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the stored annotations for one `.lab` file.
///
/// Deletes before inserting so re-running the phase never duplicates rows.
pub async fn replace_mcgill_chords(pool: &SqlitePool, file: &LabFile) -> Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM mcgill_chords WHERE song_filename = ?")
        .bind(&file.song_filename)
        .execute(&mut *tx)
        .await?;

    for chord in &file.chords {
        sqlx::query(
            "INSERT INTO mcgill_chords \
             (song_filename, start_time, end_time, duration, chord_label, chord_simplified) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.song_filename)
        .bind(chord.start_time)
        .bind(chord.end_time)
        .bind(chord.duration())
        .bind(&chord.chord_label)
        .bind(&chord.chord_simplified)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(file.chords.len())
}

/// Insert or update one Billboard chart row.
pub async fn upsert_billboard_entry(pool: &SqlitePool, row: &ChartRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO billboard_entries (song_id, title, artist, peak_position, year)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(song_id) DO UPDATE SET
            title = excluded.title,
            artist = excluded.artist,
            peak_position = excluded.peak_position,
            year = excluded.year
        "#,
    )
    .bind(row.song_id)
    .bind(&row.title)
    .bind(&row.artist)
    .bind(row.peak_position)
    .bind(row.year)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record one song-to-chart link, replacing any previous link for that song.
pub async fn upsert_match(pool: &SqlitePool, outcome: &MatchOutcome) -> Result<()> {
    sqlx::query("DELETE FROM song_matches WHERE song_id = ?")
        .bind(outcome.song_id)
        .execute(pool)
        .await?;

    sqlx::query(
        "INSERT INTO song_matches (song_id, billboard_song_id, match_type, confidence) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(outcome.song_id)
    .bind(outcome.billboard_song_id)
    .bind(outcome.match_type.as_str())
    .bind(outcome.confidence)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch all songs as matching candidates.
pub async fn fetch_song_candidates(pool: &SqlitePool) -> Result<Vec<SongCandidate>> {
    let rows: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT id, title, artist FROM songs ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, title, artist)| SongCandidate { id, title, artist })
        .collect())
}

/// Songs matched to a chart entry but still lacking a chord progression.
///
/// Returns `(song_id, billboard_song_id)` pairs for the annotation backfill.
pub async fn fetch_unfilled_matches(pool: &SqlitePool) -> Result<Vec<(i64, i64)>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT m.song_id, m.billboard_song_id \
         FROM song_matches m JOIN songs s ON s.id = m.song_id \
         WHERE s.chord_progression IS NULL",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the stored annotations for one corpus song, in time order.
///
/// Corpus directories are zero-padded to four digits, so both the padded and
/// plain spellings of the id are accepted.
pub async fn fetch_mcgill_simplified(
    pool: &SqlitePool,
    billboard_song_id: i64,
) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT chord_simplified FROM mcgill_chords \
         WHERE song_filename = ? OR song_filename = ? \
         ORDER BY start_time",
    )
    .bind(format!("{:04}", billboard_song_id))
    .bind(billboard_song_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(label,)| label).collect())
}

/// Backfill `songs.chord_progression` by song id.
pub async fn set_chord_progression_by_id(
    pool: &SqlitePool,
    song_id: i64,
    progression: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE songs SET chord_progression = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(progression)
    .bind(song_id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchType;
    use crate::mcgill::LabChord;
    use chordboard_common::db::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        pool
    }

    fn meta(title: &str, year: i64, position: i64) -> SongMeta {
        SongMeta {
            title: title.to_string(),
            artist: "Artist".to_string(),
            year,
            position,
            genre_broad: None,
            genre_specific: None,
            time_signature: None,
            tonic: None,
            mode: None,
            bpm: None,
            audio_link: None,
            has_lyrics: true,
            folder_path: format!("bimmuda_dataset/{}/{:02}", year, position),
        }
    }

    #[tokio::test]
    async fn upsert_song_is_idempotent_on_year_position() {
        let pool = pool().await;

        upsert_song(&pool, &meta("First Title", 1955, 1)).await.unwrap();
        upsert_song(&pool, &meta("Updated Title", 1955, 1)).await.unwrap();

        let (count, title): (i64, String) =
            sqlx::query_as("SELECT COUNT(*), MAX(title) FROM songs")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, "Updated Title");
    }

    #[tokio::test]
    async fn midi_updates_require_existing_song() {
        let pool = pool().await;
        upsert_song(&pool, &meta("Song", 1960, 2)).await.unwrap();

        assert!(set_midi_file(&pool, 1960, 2, "1960_02_full.mid").await.unwrap());
        assert!(!set_midi_file(&pool, 1999, 9, "nope.mid").await.unwrap());

        assert!(set_chord_progression(&pool, 1960, 2, "C - G - Am").await.unwrap());
        let progression: Option<String> =
            sqlx::query_scalar("SELECT chord_progression FROM songs WHERE year = 1960")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(progression.as_deref(), Some("C - G - Am"));
    }

    #[tokio::test]
    async fn replace_mcgill_chords_never_duplicates() {
        let pool = pool().await;
        let file = LabFile {
            song_filename: "0004".to_string(),
            path: "0004/majmin.lab".into(),
            chords: vec![LabChord {
                start_time: 0.0,
                end_time: 2.0,
                chord_label: "C:maj".to_string(),
                chord_simplified: "C".to_string(),
            }],
        };

        replace_mcgill_chords(&pool, &file).await.unwrap();
        replace_mcgill_chords(&pool, &file).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mcgill_chords")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn match_backfill_roundtrip() {
        let pool = pool().await;
        upsert_song(&pool, &meta("Song", 1958, 1)).await.unwrap();
        upsert_billboard_entry(
            &pool,
            &ChartRow {
                song_id: 4,
                title: "Song".to_string(),
                artist: "Artist".to_string(),
                peak_position: Some(1),
                year: Some(1958),
            },
        )
        .await
        .unwrap();

        let song_id: i64 = sqlx::query_scalar("SELECT id FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        upsert_match(
            &pool,
            &MatchOutcome {
                song_id,
                billboard_song_id: 4,
                match_type: MatchType::Exact,
                confidence: 1.0,
            },
        )
        .await
        .unwrap();

        // Song has no progression yet, so it shows up for backfill
        let pending = fetch_unfilled_matches(&pool).await.unwrap();
        assert_eq!(pending, vec![(song_id, 4)]);

        // Padded corpus directory name resolves through the billboard id
        let file = LabFile {
            song_filename: "0004".to_string(),
            path: "0004/majmin.lab".into(),
            chords: vec![LabChord {
                start_time: 0.0,
                end_time: 2.0,
                chord_label: "G:maj".to_string(),
                chord_simplified: "G".to_string(),
            }],
        };
        replace_mcgill_chords(&pool, &file).await.unwrap();
        let labels = fetch_mcgill_simplified(&pool, 4).await.unwrap();
        assert_eq!(labels, vec!["G"]);

        set_chord_progression_by_id(&pool, song_id, "G").await.unwrap();
        assert!(fetch_unfilled_matches(&pool).await.unwrap().is_empty());
    }
}
