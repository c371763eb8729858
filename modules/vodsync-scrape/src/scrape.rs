//! Spawn the scraper and stream its output to completion.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{info, warn};

use vodsync_core::RawVideo;

use crate::command::{build_args, shell_join};
use crate::error::{Result, ScrapeError};
use crate::stream::LineAssembler;

const READ_BUF_SIZE: usize = 8192;

/// Knobs for one scraper invocation.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Liveness log interval. Purely observational.
    pub heartbeat: Duration,
    /// Log a progress line every N parsed entries.
    pub progress_interval: u64,
    /// Cap on items requested (`--playlist-end`).
    pub max_videos: Option<u64>,
    /// User-supplied extra arguments, already split.
    pub extra_args: Vec<String>,
    pub verbose: bool,
}

/// Run the scraper against `url` and collect its line-delimited JSON output.
///
/// stdout chunks feed the line assembler as they arrive; stderr is captured
/// for diagnostics and passed through verbatim. A heartbeat fires on
/// `options.heartbeat` whenever the process has been silent for a full
/// interval. Completion policy: a non-zero exit with zero parsed records is
/// fatal; a non-zero exit with records is a partial success (the scraper's
/// error-tolerant mode reports per-item failures through its exit code).
pub async fn scrape_channel(
    executable: &Path,
    url: &str,
    options: &ScrapeOptions,
) -> Result<Vec<RawVideo>> {
    let args = build_args(options, url);
    info!(command = %shell_join(executable, &args), "Running scraper");

    let work_dir = executable.parent().filter(|p| !p.as_os_str().is_empty());
    let mut command = Command::new(executable);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = work_dir {
        command.current_dir(dir);
    }
    let mut child = command.spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("scraper stdout was not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("scraper stderr was not captured"))?;

    let mut assembler = LineAssembler::new(options.progress_interval);
    let mut stderr_buf = String::new();
    let mut out_chunk = [0u8; READ_BUF_SIZE];
    let mut err_chunk = [0u8; READ_BUF_SIZE];
    let mut out_done = false;
    let mut err_done = false;
    let mut last_output = Instant::now();

    let mut heartbeat = tokio::time::interval_at(
        tokio::time::Instant::now() + options.heartbeat,
        options.heartbeat,
    );
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    while !(out_done && err_done) {
        tokio::select! {
            read = stdout.read(&mut out_chunk), if !out_done => {
                let n = read?;
                if n == 0 {
                    out_done = true;
                } else {
                    last_output = Instant::now();
                    if let Err(error) = assembler.push_chunk(&out_chunk[..n]) {
                        // Best-effort kill; the run is already failed.
                        let _ = child.start_kill();
                        return Err(error);
                    }
                }
            }
            read = stderr.read(&mut err_chunk), if !err_done => {
                let n = read?;
                if n == 0 {
                    err_done = true;
                } else {
                    last_output = Instant::now();
                    let text = String::from_utf8_lossy(&err_chunk[..n]);
                    // Verbatim pass-through of the scraper's diagnostics.
                    eprint!("{text}");
                    stderr_buf.push_str(&text);
                }
            }
            _ = heartbeat.tick() => {
                if last_output.elapsed() >= options.heartbeat {
                    info!(
                        parsed = assembler.parsed(),
                        silent_secs = last_output.elapsed().as_secs(),
                        "Scraper still running"
                    );
                }
            }
        }
    }

    let status = child.wait().await?;
    let videos = assembler.finish()?;

    if !status.success() {
        if videos.is_empty() {
            return Err(ScrapeError::ScraperFailed {
                code: status.code(),
                stderr: stderr_buf.trim().to_string(),
            });
        }
        // Partial success: per-item failures surfaced as a non-zero exit,
        // but the parsed batch is still usable.
        warn!(
            code = ?status.code(),
            parsed = videos.len(),
            stderr = stderr_buf.trim(),
            "Scraper exited non-zero; keeping parsed entries"
        );
    } else if !stderr_buf.trim().is_empty() {
        warn!(stderr = stderr_buf.trim(), "Scraper diagnostics");
    }

    if videos.is_empty() {
        return Err(ScrapeError::NoVideos);
    }

    Ok(videos)
}
