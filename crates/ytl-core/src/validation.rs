//! Video link validation.

use std::sync::OnceLock;

use regex::Regex;

fn youtube_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.youtube\.com|youtu\.be)/.+$").expect("valid regex")
    })
}

/// True if `url` looks like a YouTube video link: optional `http(s)://`, then
/// `www.youtube.com` or `youtu.be`, then a non-empty path.
///
/// Purely syntactic; no network access.
pub fn is_valid_youtube_url(url: &str) -> bool {
    youtube_url_re().is_match(url)
}
