//! Postgres persistence for normalized video rows.
//!
//! The batch engine (`sync_videos`) is written against the `VideoSink`
//! trait so it can be exercised without a database; `VideoStore` is the
//! Postgres implementation, `MemorySink` the in-memory one for tests.

pub mod error;
pub mod sink;
pub mod store;
pub mod sync;

pub use error::{Result, StoreError};
pub use sink::{MemorySink, VideoSink};
pub use store::VideoStore;
pub use sync::sync_videos;
