use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Result, TranscriptError};

static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:[A-Za-z0-9-]+\.)*(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:$|[?&#/])",
    )
    .expect("video url pattern is valid")
});

/// Video identity and display info, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub id: String,
    /// Raw display title. Only the sanitized form goes into filenames.
    pub title: String,
    pub channel: String,
    pub source_url: String,
}

/// Extract the 11-character video id from a watch, embed, shorts or youtu.be link.
pub fn extract_video_id(url: &str) -> Result<String> {
    VIDEO_URL_RE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| TranscriptError::InvalidUrl {
            url: url.to_string(),
        })
}
