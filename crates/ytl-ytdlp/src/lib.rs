//! yt-dlp adapter (video metadata).
//!
//! Runs `yt-dlp --dump-single-json` for a single video and extracts the title.

use std::{collections::VecDeque, path::PathBuf, process::Stdio, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ytl_core::{
    errors::Error,
    ports::{MetadataLookup, MetadataProvider, VideoMetadata},
    Result,
};

const STDERR_TAIL_MAX_BYTES: usize = 4 * 1024;
const STDERR_TAIL_MAX_LINES: usize = 20;

#[derive(Clone, Debug)]
pub struct YtDlpConfig {
    pub ytdlp_path: PathBuf,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct YtDlpClient {
    cfg: YtDlpConfig,
    shutdown: CancellationToken,
}

#[derive(Clone, Debug, Default)]
struct StderrTail {
    lines: VecDeque<String>,
    bytes: usize,
}

impl StderrTail {
    fn from_bytes(raw: &[u8]) -> Self {
        let mut tail = Self::default();
        for line in String::from_utf8_lossy(raw).lines() {
            let line = line.trim_end();
            if !line.is_empty() {
                tail.push_line(line.to_string());
            }
        }
        tail
    }

    fn push_line(&mut self, line: String) {
        // +1 for the '\n' we join with later.
        self.bytes = self.bytes.saturating_add(line.len() + 1);
        self.lines.push_back(line);

        while self.lines.len() > STDERR_TAIL_MAX_LINES || self.bytes > STDERR_TAIL_MAX_BYTES {
            if let Some(front) = self.lines.pop_front() {
                self.bytes = self.bytes.saturating_sub(front.len() + 1);
            } else {
                break;
            }
        }
    }

    fn snapshot(&self) -> String {
        self.lines.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

#[derive(Deserialize)]
struct InfoJson {
    title: Option<String>,
}

/// Arguments for a single-video, non-interactive metadata dump.
pub fn build_args(url: &str) -> Vec<String> {
    [
        "--dump-single-json",
        "--no-playlist",
        "--skip-download",
        "--no-warnings",
        "--quiet",
        "--ignore-config",
        "--",
        url,
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Pull a non-blank title out of yt-dlp's JSON dump.
pub fn parse_title(stdout: &[u8]) -> Result<String> {
    let info: InfoJson = serde_json::from_slice(stdout)?;
    info.title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::External("yt-dlp output has no title".to_string()))
}

impl YtDlpClient {
    /// `shutdown` aborts in-flight lookups (the child process is killed).
    pub fn new(cfg: YtDlpConfig, shutdown: CancellationToken) -> Self {
        Self { cfg, shutdown }
    }

    pub async fn fetch_title(&self, url: &str) -> Result<String> {
        let mut cmd = Command::new(&self.cfg.ytdlp_path);
        cmd.args(build_args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::External(format!(
                "failed to start {}: {e}",
                self.cfg.ytdlp_path.display()
            ))
        })?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
          _ = self.shutdown.cancelled() => {
            return Err(Error::External("Cancelled".to_string()));
          }
          res = tokio::time::timeout(self.cfg.timeout, child.wait_with_output()) => match res {
            Ok(out) => out?,
            Err(_) => {
              return Err(Error::Timeout {
                operation: "yt-dlp metadata lookup",
                millis: self.cfg.timeout.as_millis(),
              });
            }
          }
        };

        if !output.status.success() {
            let stderr = StderrTail::from_bytes(&output.stderr).snapshot();
            let mut msg = format!("yt-dlp exited with {}", output.status);
            if !stderr.is_empty() {
                msg.push_str("\nstderr (tail):\n");
                msg.push_str(&stderr);
            }
            return Err(Error::External(msg));
        }

        parse_title(&output.stdout)
    }
}

#[async_trait]
impl MetadataProvider for YtDlpClient {
    async fn lookup(&self, url: &str) -> MetadataLookup {
        match self.fetch_title(url).await {
            Ok(title) => {
                debug!(url, %title, "resolved video title");
                MetadataLookup::Found(VideoMetadata { title })
            }
            Err(e) if self.shutdown.is_cancelled() => {
                info!(url, error = %e, "metadata lookup interrupted by shutdown");
                MetadataLookup::Interrupted
            }
            Err(e) => MetadataLookup::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}
