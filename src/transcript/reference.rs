//! Parsing of user-supplied YouTube video references.

use crate::error::{Result, VidQaError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"))
}

/// A resolved reference to one YouTube video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoReference {
    video_id: String,
}

impl VideoReference {
    /// Parse a watch/short/embed URL or a bare 11-character video ID.
    pub fn parse(input: &str) -> Result<Self> {
        extract_video_id(input)
            .map(|video_id| Self { video_id })
            .ok_or_else(|| {
                VidQaError::InvalidVideoReference(format!(
                    "Could not find a YouTube video ID in '{}'",
                    input.trim()
                ))
            })
    }

    /// The 11-character video ID.
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Watch URL that starts playback at the given offset.
    pub fn url_at(&self, seconds: f64) -> String {
        format!(
            "https://youtube.com/watch?v={}&t={}s",
            self.video_id,
            seconds.max(0.0) as u32
        )
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.video_id)
    }
}

impl std::str::FromStr for VideoReference {
    type Err = VidQaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Extract the video ID from any supported input form.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if video_id_regex().is_match(input) {
        return Some(input.to_string());
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&with_scheme).ok()?;

    let host = url.host_str()?.to_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(&host);

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let candidate = match host {
        "youtu.be" => segments.first().map(|s| s.to_string()),
        "youtube.com" | "youtube-nocookie.com" => match segments.as_slice() {
            ["watch"] | [] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            ["shorts" | "embed" | "v" | "live", id, ..] => Some(id.to_string()),
            _ => None,
        },
        _ => None,
    }?;

    video_id_regex()
        .is_match(&candidate)
        .then_some(candidate)
}
