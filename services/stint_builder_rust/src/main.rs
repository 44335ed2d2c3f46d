//! Stint Builder Rust Service
//!
//! Season batch job that turns play-by-play logs into per-lineup stint tables.
//!
//! This service:
//! - Reads the schedule, play-by-play and box-score dumps for a season
//! - Replays each game to reconstruct the five players on court per team
//! - Aggregates per-(team, period, lineup) stints
//! - Appends them to per-team CSV tables and renumbers games

mod config;

use anyhow::{Context, Result};
use config::PipelineConfig;
use courtedge_core::{run_batch, JsonDirSource};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Stint Builder...");

    let config = PipelineConfig::from_env();
    info!(
        data_dir = %config.data_dir().display(),
        output_dir = %config.output_dir.display(),
        prefix = %config.game_id_prefix,
        "Loaded configuration"
    );

    if config.worker_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .build_global()
            .context("Failed to configure replay workers")?;
    }

    let tables = Arc::new(config.load_tables()?);
    let source = JsonDirSource::new(config.data_dir());
    let store = config.store();

    let summary = run_batch(&source, tables, &store, &config.batch_options()).await?;

    for skipped in &summary.skipped {
        warn!(game_id = %skipped.game_id, reason = %skipped.reason, "Game skipped");
    }
    info!(
        replayed = summary.replayed,
        skipped = summary.skipped.len(),
        excluded_events = summary.excluded_events(),
        rows = summary.rows_written,
        elapsed_secs = summary.elapsed().num_seconds(),
        "Stint Builder finished"
    );
    Ok(())
}
