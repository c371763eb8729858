//! The upsert seam, plus an in-memory implementation for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vodsync_core::VideoRow;

use crate::error::Result;

/// Destination for normalized rows. One call is one conflict-aware batch
/// insert: new ids are created, existing ids are fully overwritten.
#[async_trait]
pub trait VideoSink: Send + Sync {
    async fn upsert_batch(&self, rows: &[VideoRow]) -> Result<()>;
}

/// In-memory sink for tests. Keyed by id like the real table; every upsert
/// replaces the whole row. Records batch sizes for assertions. Thread-safe.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<HashMap<String, VideoRow>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, id: &str) -> Option<VideoRow> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Sizes of the batches applied so far, in order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSink for MemorySink {
    async fn upsert_batch(&self, rows: &[VideoRow]) -> Result<()> {
        let mut map = self.rows.lock().unwrap();
        for row in rows {
            map.insert(row.id.clone(), row.clone());
        }
        self.batch_sizes.lock().unwrap().push(rows.len());
        Ok(())
    }
}

#[async_trait]
impl<S: VideoSink + ?Sized> VideoSink for Arc<S> {
    async fn upsert_batch(&self, rows: &[VideoRow]) -> Result<()> {
        (**self).upsert_batch(rows).await
    }
}
