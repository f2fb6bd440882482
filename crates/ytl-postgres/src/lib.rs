//! PostgreSQL adapter for the `videos` table.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use ytl_core::{
    domain::{NewVideo, VideoRecord},
    errors::Error,
    ports::{InsertOutcome, VideoStore},
    Result,
};

/// Idempotent schema setup. The unique index closes the exists/insert race.
const SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS videos (
        youtube_url TEXT NOT NULL,
        title       TEXT NOT NULL,
        author      TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS videos_youtube_url_key ON videos (youtube_url)",
];

// `created_at` may be TIMESTAMP in tables created by older deployments; the
// cast reads both column types the same way.
const SELECT_PAGE: &str = "SELECT youtube_url, title, author, created_at::timestamptz AS created_at
     FROM videos
     ORDER BY created_at DESC, youtube_url
     LIMIT $1 OFFSET $2";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone, Debug)]
pub struct PgStoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct PgVideoStore {
    pool: PgPool,
    query_timeout: Duration,
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    youtube_url: String,
    title: String,
    author: String,
    created_at: DateTime<Utc>,
}

impl From<VideoRow> for VideoRecord {
    fn from(r: VideoRow) -> Self {
        Self {
            url: r.youtube_url,
            title: r.title,
            author: r.author,
            created_at: r.created_at,
        }
    }
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl PgVideoStore {
    /// Connect the pool and make sure the table and its unique index exist.
    pub async fn connect(cfg: &PgStoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout)
            .connect(&cfg.database_url)
            .await
            .map_err(store_err)?;
        info!(
            max_connections = cfg.max_connections,
            "connected to PostgreSQL"
        );

        let store = Self::from_pool(pool, cfg.query_timeout);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            self.bounded("schema setup", sqlx::query(stmt).execute(&self.pool))
                .await?
                .map_err(store_err)?;
        }
        Ok(())
    }

    /// Run one pool operation under the per-query timeout. The outer error is
    /// the timeout; the inner one is left to the caller to classify.
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<std::result::Result<T, sqlx::Error>>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        tokio::time::timeout(self.query_timeout, fut)
            .await
            .map_err(|_| Error::StoreTimeout {
                operation,
                millis: self.query_timeout.as_millis(),
            })
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        self.bounded(
            "video exists check",
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM videos WHERE youtube_url = $1)",
            )
            .bind(url)
            .fetch_one(&self.pool),
        )
        .await?
        .map_err(store_err)
    }

    async fn insert(&self, video: NewVideo) -> Result<InsertOutcome> {
        let res = self
            .bounded(
                "video insert",
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "INSERT INTO videos (youtube_url, title, author) VALUES ($1, $2, $3)
                     RETURNING created_at::timestamptz",
                )
                .bind(&video.url)
                .bind(&video.title)
                .bind(&video.author)
                .fetch_one(&self.pool),
            )
            .await?;

        match res {
            Ok(created_at) => Ok(InsertOutcome::Inserted(VideoRecord {
                url: video.url,
                title: video.title,
                author: video.author,
                created_at,
            })),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn count(&self) -> Result<u64> {
        let n = self
            .bounded(
                "video count",
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos").fetch_one(&self.pool),
            )
            .await?
            .map_err(store_err)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<VideoRecord>> {
        let rows = self
            .bounded(
                "video page",
                sqlx::query_as::<_, VideoRow>(SELECT_PAGE)
                    .bind(to_i64(limit))
                    .bind(to_i64(offset))
                    .fetch_all(&self.pool),
            )
            .await?
            .map_err(store_err)?;
        Ok(rows.into_iter().map(VideoRecord::from).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}
