//! Typed errors for the scraping pipeline.

use thiserror::Error;

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No scraper executable found between the start directory and the
    /// filesystem root. Fatal before anything is spawned.
    #[error(
        "Unable to locate yt-dlp or yt-dlp.sh. Run this inside a checkout that contains the scraper."
    )]
    ExecutableNotFound,

    /// A stdout line (or the trailing buffer) was not valid JSON.
    /// Fatal: the output contract is one JSON object per line.
    #[error("Failed to parse scraper output: {message}")]
    Parse { message: String },

    /// The scraper exited non-zero without producing a single record.
    #[error("Scraper exited with code {code:?}. stderr:\n{stderr}")]
    ScraperFailed { code: Option<i32>, stderr: String },

    /// The scraper completed but produced zero records.
    #[error("Scraper returned no videos; nothing to persist")]
    NoVideos,

    #[error("Scraper I/O error: {0}")]
    Io(#[from] std::io::Error),
}
