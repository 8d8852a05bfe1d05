//! Database initialization tests

use chordboard_common::db::{create_tables, ensure_setting, init_database};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    create_tables(&pool).await.expect("create tables");
    pool
}

#[tokio::test]
async fn init_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("chordboard.db");

    let pool = init_database(&db_path).await.expect("init database");
    assert!(db_path.exists());

    // Default settings are seeded on first run
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'chord_max_chords'")
            .fetch_optional(&pool)
            .await
            .unwrap();
    assert_eq!(value.as_deref(), Some("8"));

    pool.close().await;
}

#[tokio::test]
async fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("chordboard.db");

    let pool = init_database(&db_path).await.expect("first init");
    sqlx::query(
        "INSERT INTO songs (title, artist, year, position) VALUES ('Maybellene', 'Chuck Berry', 1955, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    // Second init must not disturb existing rows
    let pool = init_database(&db_path).await.expect("second init");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    pool.close().await;
}

#[tokio::test]
async fn songs_unique_per_year_and_position() {
    let pool = memory_pool().await;

    sqlx::query("INSERT INTO songs (title, artist, year, position) VALUES ('A', 'X', 1960, 1)")
        .execute(&pool)
        .await
        .unwrap();
    let dup =
        sqlx::query("INSERT INTO songs (title, artist, year, position) VALUES ('B', 'Y', 1960, 1)")
            .execute(&pool)
            .await;
    assert!(dup.is_err());
}

#[tokio::test]
async fn ensure_setting_keeps_existing_value() {
    let pool = memory_pool().await;

    ensure_setting(&pool, "web_listen_port", "5000").await.unwrap();
    sqlx::query("UPDATE settings SET value = '8080' WHERE key = 'web_listen_port'")
        .execute(&pool)
        .await
        .unwrap();

    // Re-running ensure_setting must not clobber the operator's value
    ensure_setting(&pool, "web_listen_port", "5000").await.unwrap();
    let value: String = sqlx::query_scalar("SELECT value FROM settings WHERE key = 'web_listen_port'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(value, "8080");
}

#[tokio::test]
async fn ensure_setting_resets_null_value() {
    let pool = memory_pool().await;

    sqlx::query("INSERT INTO settings (key, value) VALUES ('match_threshold', NULL)")
        .execute(&pool)
        .await
        .unwrap();

    ensure_setting(&pool, "match_threshold", "0.8").await.unwrap();
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'match_threshold'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(value.as_deref(), Some("0.8"));
}

#[tokio::test]
async fn song_matches_reject_unknown_song() {
    let pool = memory_pool().await;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO song_matches (song_id, billboard_song_id, match_type, confidence) \
         VALUES (999, 999, 'exact', 1.0)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
