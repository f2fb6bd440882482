//! In-memory `VideoStore`.
//!
//! Same contract as the PostgreSQL adapter; backs the core's tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    domain::{NewVideo, VideoRecord},
    ports::{InsertOutcome, VideoStore},
    Result,
};

#[derive(Debug, Default)]
pub struct MemoryVideoStore {
    // Insertion order; newest last.
    rows: Mutex<Vec<VideoRecord>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        Ok(self.rows.lock().await.iter().any(|r| r.url == url))
    }

    async fn insert(&self, video: NewVideo) -> Result<InsertOutcome> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|r| r.url == video.url) {
            return Ok(InsertOutcome::Duplicate);
        }

        // Strictly increasing timestamps keep recency order stable even when
        // the clock does not advance between inserts.
        let now = Utc::now();
        let created_at = match rows.last() {
            Some(last) if last.created_at >= now => last.created_at + Duration::microseconds(1),
            _ => now,
        };

        let record = VideoRecord {
            url: video.url,
            title: video.title,
            author: video.author,
            created_at,
        };
        rows.push(record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.lock().await.len() as u64)
    }

    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<VideoRecord>> {
        let rows = self.rows.lock().await;
        let mut newest_first: Vec<&VideoRecord> = rows.iter().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(newest_first
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(n: usize) -> NewVideo {
        NewVideo {
            url: format!("https://youtu.be/v{n}"),
            title: format!("Video {n}"),
            author: "ann".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_exists_and_count() {
        let store = MemoryVideoStore::new();
        assert!(!store.exists("https://youtu.be/v1").await.unwrap());

        let out = store.insert(video(1)).await.unwrap();
        assert!(matches!(out, InsertOutcome::Inserted(ref r) if r.title == "Video 1"));
        assert!(store.exists("https://youtu.be/v1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_url_is_rejected() {
        let store = MemoryVideoStore::new();
        store.insert(video(1)).await.unwrap();
        assert_eq!(
            store.insert(video(1)).await.unwrap(),
            InsertOutcome::Duplicate
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn pages_newest_first() {
        let store = MemoryVideoStore::new();
        for n in 1..=7 {
            store.insert(video(n)).await.unwrap();
        }

        let first: Vec<String> = store
            .page(0, 5)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(
            first,
            vec!["Video 7", "Video 6", "Video 5", "Video 4", "Video 3"]
        );

        let second = store.page(5, 5).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].title, "Video 1");

        assert!(store.page(10, 5).await.unwrap().is_empty());
    }
}
