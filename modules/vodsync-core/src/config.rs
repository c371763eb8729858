//! Run configuration loaded from environment variables.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_CHANNEL_URL: &str = "https://www.youtube.com/@CareyNieuwhof/videos";

/// Everything a sync run needs, resolved once at startup.
/// Defaults and floors are applied here so the rest of the pipeline can
/// trust the values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Channel videos page handed to the scraper as its target.
    pub channel_url: String,
    /// Log a progress line every N parsed entries. Floor 1.
    pub progress_interval: u64,
    /// Heartbeat interval for the liveness log. Floor 1s.
    pub heartbeat: Duration,
    /// Cap on items requested from the scraper (`--playlist-end`).
    pub max_videos: Option<u64>,
    /// Extra scraper arguments, shell-quoted, split at spawn time.
    pub extra_args: Option<String>,
    /// Prepend `--verbose` to the scraper invocation.
    pub verbose: bool,
    /// Rows per upsert batch. Floor 1.
    pub batch_size: usize,
    pub database_url: String,
    pub pool_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("VODSYNC_DATABASE_URL"))
            .context("DATABASE_URL (or VODSYNC_DATABASE_URL) is required")?;

        Ok(Self {
            channel_url: std::env::var("VODSYNC_CHANNEL_URL")
                .unwrap_or_else(|_| DEFAULT_CHANNEL_URL.to_string()),
            progress_interval: positive_int(env_opt("VODSYNC_PROGRESS_INTERVAL"))
                .unwrap_or(25)
                .max(1),
            heartbeat: Duration::from_millis(
                positive_int(env_opt("VODSYNC_HEARTBEAT_MS"))
                    .unwrap_or(15_000)
                    .max(1000),
            ),
            max_videos: positive_int(env_opt("VODSYNC_MAX_VIDEOS")),
            extra_args: env_opt("VODSYNC_EXTRA_ARGS").filter(|s| !s.trim().is_empty()),
            verbose: is_truthy(env_opt("VODSYNC_VERBOSE")),
            batch_size: positive_int(env_opt("VODSYNC_DB_BATCH_SIZE")).unwrap_or(250).max(1)
                as usize,
            pool_size: positive_int(env_opt("VODSYNC_DB_POOL_SIZE")).unwrap_or(5) as u32,
            database_url,
        })
    }

    pub fn log_summary(&self) {
        tracing::info!(
            channel = %self.channel_url,
            batch_size = self.batch_size,
            heartbeat_ms = self.heartbeat.as_millis() as u64,
            max_videos = ?self.max_videos,
            verbose = self.verbose,
            "Config loaded"
        );
    }
}

/// Load the nearest env file: search `.env.local` then `.env` in `start_dir`
/// and each ancestor, stopping at the first hit. Falls back to the
/// default dotenv lookup if none is found. Existing process env always wins.
pub fn load_env_files(start_dir: &Path) {
    let mut visited = HashSet::new();
    let mut dir = start_dir.to_path_buf();

    while visited.insert(dir.clone()) {
        for name in [".env.local", ".env"] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                if let Err(error) = dotenvy::from_path(&candidate) {
                    tracing::warn!(path = %candidate.display(), %error, "Failed to load env file");
                }
                return;
            }
        }
        if !dir.pop() {
            break;
        }
    }

    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Positive integer or nothing. Zero, negatives and garbage all fall back
/// to the caller's default.
fn positive_int(raw: Option<String>) -> Option<u64> {
    let value: f64 = raw?.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then(|| value.floor() as u64)
}

fn is_truthy(raw: Option<String>) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
