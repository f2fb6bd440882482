use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::ChatId, errors::Error, Result};

/// Where successful submissions are mirrored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnounceChannel {
    Id(ChatId),
    /// `@channel` handle; resolved to a numeric id at startup.
    Username(String),
}

impl AnnounceChannel {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Some(name) = raw.strip_prefix('@') {
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(Error::Config(format!(
                    "ANNOUNCE_CHANNEL is not a valid channel username: {raw}"
                )));
            }
            return Ok(Self::Username(raw.to_string()));
        }

        raw.parse::<i64>()
            .map(|id| Self::Id(ChatId(id)))
            .map_err(|_| {
                Error::Config(format!(
                    "ANNOUNCE_CHANNEL must be a numeric chat id or @username, got: {raw}"
                ))
            })
    }
}

/// Typed configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub announce_channel: AnnounceChannel,

    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_query_timeout: Duration,

    // Metadata
    pub ytdlp_path: PathBuf,
    pub metadata_timeout: Duration,

    // Lifecycle
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in `load`).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            get(key).and_then(non_empty).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };
        let millis = |key: &str, default: u64| -> Duration {
            Duration::from_millis(
                get(key)
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(default),
            )
        };

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let database_url = required("DATABASE_URL")?;
        let announce_channel = AnnounceChannel::parse(&required("ANNOUNCE_CHANNEL")?)?;

        let db_max_connections = get("DB_MAX_CONNECTIONS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);
        let db_acquire_timeout = millis("DB_ACQUIRE_TIMEOUT_MS", 5_000);
        let db_query_timeout = millis("DB_QUERY_TIMEOUT_MS", 10_000);

        let ytdlp_path = get("YTDLP_PATH")
            .and_then(non_empty)
            .map(PathBuf::from)
            .or_else(|| which_in_path("yt-dlp"))
            .unwrap_or_else(|| PathBuf::from("/usr/local/bin/yt-dlp"));
        let metadata_timeout = millis("METADATA_TIMEOUT_MS", 30_000);

        let shutdown_grace = millis("SHUTDOWN_GRACE_MS", 10_000);

        Ok(Self {
            telegram_bot_token,
            announce_channel,
            database_url,
            db_max_connections,
            db_acquire_timeout,
            db_query_timeout,
            ytdlp_path,
            metadata_timeout,
            shutdown_grace,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn which_in_path(binary: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        let candidate = dir.join(binary);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_executable_file(p: &Path) -> bool {
    if !p.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(md) = fs::metadata(p) {
            return (md.permissions().mode() & 0o111) != 0;
        }
    }
    true
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
