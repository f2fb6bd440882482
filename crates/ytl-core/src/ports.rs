use async_trait::async_trait;

use crate::{
    domain::{NewVideo, VideoRecord},
    Result,
};

/// Result of an insert attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(VideoRecord),
    /// The engine's uniqueness constraint rejected the URL (lost a race with
    /// another submission of the same link).
    Duplicate,
}

/// Accessor over the `videos` table.
///
/// Implementations acquire a connection per call and release it on every exit
/// path. `exists` followed by `insert` is not atomic; `insert` must report a
/// uniqueness violation as `InsertOutcome::Duplicate` rather than an error.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool>;
    async fn insert(&self, video: NewVideo) -> Result<InsertOutcome>;
    async fn count(&self) -> Result<u64>;
    /// Most recently created first.
    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<VideoRecord>>;

    /// Release pooled resources. Called once on shutdown.
    async fn close(&self) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
}

/// Structured outcome of a metadata lookup. Failures never propagate as errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataLookup {
    Found(VideoMetadata),
    /// `reason` is for the log only; users see a generic "unavailable" reply.
    Unavailable { reason: String },
    /// The process is shutting down; the video itself was never judged.
    Interrupted,
}

/// Video-info provider (yt-dlp in production).
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, url: &str) -> MetadataLookup;
}
