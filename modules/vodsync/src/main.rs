//! Channel sync run: scrape → sort → normalize → upsert.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vodsync_core::{
    config::load_env_files, normalize, sort_by_recency, Config, NormalizeOutcome, VideoRow,
};
use vodsync_scrape::{locate_executable, scrape_channel, split_args, ScrapeOptions};
use vodsync_store::{sync_videos, VideoStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vodsync=info".parse()?))
        .init();

    let base_dir = runtime_dir();
    load_env_files(&base_dir);
    let config = Config::from_env()?;
    config.log_summary();

    let executable = locate_executable(&base_dir)?;
    info!(path = %executable.display(), "Using scraper executable");

    let store = VideoStore::connect(&config.database_url, config.pool_size).await?;
    store.migrate().await?;

    // The pool is torn down exactly once, on every exit path from the
    // scrape+persist block; a slow close never changes the run's outcome.
    let outcome = run(&config, &executable, &store).await;
    store.close().await;
    outcome
}

async fn run(config: &Config, executable: &Path, store: &VideoStore) -> Result<()> {
    info!(url = %config.channel_url, "Scraping channel");
    let options = ScrapeOptions {
        heartbeat: config.heartbeat,
        progress_interval: config.progress_interval,
        max_videos: config.max_videos,
        extra_args: config.extra_args.as_deref().map(split_args).unwrap_or_default(),
        verbose: config.verbose,
    };

    let mut raw = scrape_channel(executable, &config.channel_url, &options).await?;
    sort_by_recency(&mut raw);

    let scraped_at = Utc::now();
    let rows: Vec<VideoRow> = raw
        .iter()
        .filter_map(|video| match normalize(video, &config.channel_url, scraped_at) {
            NormalizeOutcome::Row(row) => Some(*row),
            NormalizeOutcome::MissingId => None,
        })
        .collect();

    let dropped = raw.len() - rows.len();
    if dropped > 0 {
        warn!(dropped, "Dropped records without a usable id");
    }

    info!(rows = rows.len(), "Persisting videos");
    sync_videos(store, &rows, config.batch_size).await?;
    Ok(())
}

/// Directory the binary runs from; the env-file and scraper searches both
/// start here.
fn runtime_dir() -> PathBuf {
    std::env::current_exe()
        .and_then(|path| path.canonicalize())
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
