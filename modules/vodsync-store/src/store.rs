//! Postgres-backed video store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, QueryBuilder};
use tracing::warn;

use vodsync_core::VideoRow;

use crate::error::Result;
use crate::sink::VideoSink;

/// Bounded wait for the pool to drain on shutdown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// One row per unique video id in the `vodsync` schema.
pub struct VideoStore {
    pool: PgPool,
}

impl VideoStore {
    /// Connect a process-wide pool. Created once at startup and torn down
    /// exactly once at run end via [`VideoStore::close`].
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Close the pool. A slow drain is logged as a warning and never
    /// changes the run's outcome.
    pub async fn close(&self) {
        if tokio::time::timeout(CLOSE_TIMEOUT, self.pool.close()).await.is_err() {
            warn!(timeout_secs = CLOSE_TIMEOUT.as_secs(), "Timed out closing database pool");
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VideoSink for VideoStore {
    /// One multi-row `INSERT ... ON CONFLICT (id) DO UPDATE` per batch.
    /// Every persisted field takes the incoming value (`excluded.*`); the
    /// newest scrape always wins entirely. `created_at` keeps its
    /// first-insert value.
    async fn upsert_batch(&self, rows: &[VideoRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<sqlx::Postgres>::new(
            "INSERT INTO vodsync.videos \
             (id, channel_url, video_url, title, description, duration_seconds, \
              published_timestamp, upload_date, uploaded_at, scraped_at, is_live, \
              raw_data, updated_at) ",
        );
        query.push_values(rows, |mut values, row| {
            values
                .push_bind(&row.id)
                .push_bind(&row.channel_url)
                .push_bind(&row.video_url)
                .push_bind(&row.title)
                .push_bind(&row.description)
                .push_bind(row.duration_seconds)
                .push_bind(row.published_timestamp)
                .push_bind(&row.upload_date)
                .push_bind(row.uploaded_at)
                .push_bind(row.scraped_at)
                .push_bind(row.is_live)
                .push_bind(&row.raw_data)
                .push_bind(row.updated_at);
        });
        query.push(
            " ON CONFLICT (id) DO UPDATE SET \
             channel_url = excluded.channel_url, \
             video_url = excluded.video_url, \
             title = excluded.title, \
             description = excluded.description, \
             duration_seconds = excluded.duration_seconds, \
             published_timestamp = excluded.published_timestamp, \
             upload_date = excluded.upload_date, \
             uploaded_at = excluded.uploaded_at, \
             scraped_at = excluded.scraped_at, \
             is_live = excluded.is_live, \
             raw_data = excluded.raw_data, \
             updated_at = excluded.updated_at",
        );

        query.build().execute(&self.pool).await?;
        Ok(())
    }
}
