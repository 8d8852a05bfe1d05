//! chordboard-web - read-only song explorer - main entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chordboard_common::config;
use chordboard_web::{build_router, db, AppState};

/// Command-line arguments for chordboard-web
#[derive(Parser, Debug)]
#[command(name = "chordboard-web")]
#[command(about = "Web explorer for the chordboard database")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "CHORDBOARD_PORT")]
    port: u16,

    /// Root folder holding the database
    #[arg(short, long, env = "CHORDBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Dataset checkout, enables lyric display
    #[arg(short, long, env = "CHORDBOARD_DATASET")]
    dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chordboard_web=info,chordboard_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root = config::resolve_root_folder(args.root.as_deref().and_then(|p| p.to_str()));
    let db_path = config::database_path(&root);
    info!("Database path: {}", db_path.display());

    let pool = db::connect_readonly(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Connected to database (read-only)");

    let state = AppState::new(pool, args.dataset);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!("chordboard-web listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
