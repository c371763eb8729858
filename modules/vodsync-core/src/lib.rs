//! Domain types and pure logic for the channel sync pipeline.
//!
//! Raw scraper output is an open-ended JSON object; everything here turns
//! that into a validated `VideoRow` (or an explicit drop) plus the recency
//! ordering applied before persistence. No I/O lives in this crate apart
//! from environment loading in `config`.

pub mod config;
pub mod normalize;
pub mod types;

pub use config::Config;
pub use normalize::{normalize, parse_upload_date, recency_key, sort_by_recency, NormalizeOutcome};
pub use types::{RawVideo, VideoRow};
