//! The batch upsert engine.

use tracing::{info, warn};

use vodsync_core::VideoRow;

use crate::error::Result;
use crate::sink::VideoSink;

/// Partition `rows` into contiguous batches (input order preserved) and
/// apply them sequentially. A failure on batch k leaves batches 1..k
/// durably applied and the rest unapplied; there is no run-level
/// transaction. Zero rows is a warning, not an error.
pub async fn sync_videos<S: VideoSink + ?Sized>(
    sink: &S,
    rows: &[VideoRow],
    batch_size: usize,
) -> Result<()> {
    if rows.is_empty() {
        warn!("No valid video entries were generated; skipping persistence");
        return Ok(());
    }

    let batch_size = batch_size.max(1);
    let mut upserted = 0usize;

    for (index, batch) in rows.chunks(batch_size).enumerate() {
        sink.upsert_batch(batch).await?;
        upserted += batch.len();
        info!(rows = batch.len(), batch = index + 1, "Upserted batch");
    }

    info!(rows = upserted, "Finished syncing videos");
    Ok(())
}
