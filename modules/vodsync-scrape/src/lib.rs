//! Child-process scraping: locate the external scraper, spawn it, and
//! stream its line-delimited JSON output into raw records.
//!
//! The scraper is a black box invoked with flags; stdout is one JSON
//! object per line, stderr is free-form diagnostics passed through
//! verbatim. A malformed stdout line is a broken output contract and
//! fails the whole run.

pub mod command;
pub mod error;
pub mod locate;
pub mod scrape;
pub mod stream;

pub use command::{build_args, shell_join, split_args};
pub use error::{Result, ScrapeError};
pub use locate::locate_executable;
pub use scrape::{scrape_channel, ScrapeOptions};
pub use stream::LineAssembler;
