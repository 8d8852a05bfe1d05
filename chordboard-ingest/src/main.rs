//! Chordboard ingest tool - main entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chordboard_common::{config, db};
use chordboard_ingest::workflow::{self, IngestOptions};

/// Command-line arguments for chordboard-ingest
#[derive(Parser, Debug)]
#[command(name = "chordboard-ingest")]
#[command(about = "Populate the chordboard database from the BiMMuDa dataset")]
#[command(version)]
struct Args {
    /// Dataset checkout containing metadata/ and bimmuda_dataset/
    #[arg(short, long, env = "CHORDBOARD_DATASET")]
    dataset: PathBuf,

    /// Root folder holding the database
    #[arg(short, long, env = "CHORDBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Process at most this many MIDI files
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the McGill annotation phase
    #[arg(long)]
    skip_mcgill: bool,

    /// Skip the Billboard chart and matching phase
    #[arg(long)]
    skip_billboard: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chordboard_ingest=info,chordboard_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root = config::resolve_root_folder(args.root.as_deref().and_then(|p| p.to_str()));
    config::ensure_root_folder(&root).context("Failed to create root folder")?;
    let db_path = config::database_path(&root);

    info!("Dataset: {}", args.dataset.display());
    info!("Database: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let options = IngestOptions {
        dataset: args.dataset,
        limit: args.limit,
        skip_mcgill: args.skip_mcgill,
        skip_billboard: args.skip_billboard,
    };

    workflow::run(&pool, &options)
        .await
        .context("Ingest run failed")?;

    pool.close().await;
    Ok(())
}
