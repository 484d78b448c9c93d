use std::path::PathBuf;

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_YT_DLP: &str = "yt-dlp";

/// `<temp dir>/yt-transcript`, i.e. `/tmp/yt-transcript` on most Unix systems.
pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("yt-transcript")
}

/// What a single run should fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    pub url: String,
    pub output_dir: PathBuf,
    pub lang: String,
}

impl TranscriptRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: default_output_dir(),
            lang: DEFAULT_LANG.to_string(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}
