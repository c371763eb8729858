//! Persistence-facing row types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item as emitted by the scraper: an open-ended JSON object.
/// No field is guaranteed present or well-typed. Transient; lives only
/// for the duration of one run.
pub type RawVideo = serde_json::Map<String, serde_json::Value>;

/// The validated persistence unit for one scraped video.
///
/// `created_at` is owned by the store (set on first insert, never
/// overwritten) and deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRow {
    /// Stable video identifier. Uniquely keys the row; re-scraping the same
    /// id updates in place.
    pub id: String,
    /// URL of the owning channel; run-level fallback when the record
    /// doesn't carry one.
    pub channel_url: String,
    /// Watch-page URL, derived via fallback chain.
    pub video_url: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<i64>,
    /// Raw publish epoch from the source, when present.
    pub published_timestamp: Option<i64>,
    /// Compact YYYYMMDD date code from the source, when present.
    pub upload_date: Option<String>,
    /// Absolute publish time derived from the epoch or the date code.
    /// Never guessed from "now".
    pub uploaded_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
    pub is_live: bool,
    /// The original record, verbatim. No partial normalization leaks in.
    pub raw_data: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
