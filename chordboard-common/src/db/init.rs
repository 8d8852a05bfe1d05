//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date
//! idempotently. Both the ingest tool and the web server call
//! [`init_database`] at startup, so every statement here must be safe to run
//! against an already-populated database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows the web server to read while an ingest run is writing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent).
///
/// Split out from [`init_database`] so tests can build the schema on an
/// in-memory pool without touching the filesystem.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_songs_table(pool).await?;
    create_billboard_entries_table(pool).await?;
    create_song_matches_table(pool).await?;
    create_mcgill_chords_table(pool).await?;
    create_settings_table(pool).await?;

    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            year INTEGER NOT NULL,
            position INTEGER NOT NULL,
            genre_broad TEXT,
            genre_specific TEXT,
            time_signature TEXT,
            tonic TEXT,
            mode TEXT,
            bpm REAL,
            audio_link TEXT,
            has_midi_files INTEGER NOT NULL DEFAULT 0,
            has_lyrics INTEGER NOT NULL DEFAULT 0,
            folder_path TEXT,
            midi_file TEXT,
            chord_progression TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(year, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_year_position ON songs(year, position)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_billboard_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS billboard_entries (
            song_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            peak_position INTEGER,
            year INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_song_matches_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_matches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            song_id INTEGER NOT NULL REFERENCES songs(id),
            billboard_song_id INTEGER NOT NULL REFERENCES billboard_entries(song_id),
            match_type TEXT NOT NULL,
            confidence REAL NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(song_id),
            UNIQUE(billboard_song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_mcgill_chords_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mcgill_chords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            song_filename TEXT NOT NULL,
            start_time REAL NOT NULL,
            end_time REAL NOT NULL,
            duration REAL NOT NULL,
            chord_label TEXT NOT NULL,
            chord_simplified TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_mcgill_song_filename ON mcgill_chords(song_filename)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize default settings
///
/// Ensures all known settings exist and resets NULL values to their defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Chord engine windowing constants, recorded so operators can inspect
    // what an ingest run used
    ensure_setting(pool, "chord_max_chords", "8").await?;
    ensure_setting(pool, "chord_min_windows", "8").await?;
    ensure_setting(pool, "chord_max_windows", "16").await?;
    ensure_setting(pool, "chord_window_secs", "2.0").await?;

    // Fuzzy matcher tunables
    ensure_setting(pool, "match_title_weight", "0.7").await?;
    ensure_setting(pool, "match_artist_weight", "0.3").await?;
    ensure_setting(pool, "match_threshold", "0.8").await?;

    // Web server
    ensure_setting(pool, "web_listen_port", "5000").await?;
    ensure_setting(pool, "web_suggestion_limit", "10").await?;

    Ok(())
}

/// Ensure a setting exists with a value, inserting the default if missing.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE handles concurrent initialization races
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!(
            "Initialized setting '{}' with default value: {}",
            key, default_value
        );
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        info!("Reset NULL setting '{}' to default: {}", key, default_value);
    }

    Ok(())
}
