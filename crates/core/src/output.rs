use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::sanitize::sanitize_title;

/// File layout of one run. Consumers rely on these names, so they are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// `<output_dir>/<id>-<sanitized title>`, handed to the fetch tool as its output template.
    pub prefix: PathBuf,
    pub subtitles: PathBuf,
    pub timestamped: PathBuf,
    pub text: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, video_id: &str, title: &str, lang: &str) -> Self {
        let prefix = output_dir.join(format!("{}-{}", video_id, sanitize_title(title)));
        Self {
            subtitles: with_suffix(&prefix, &format!(".{lang}.srt")),
            timestamped: with_suffix(&prefix, "_timestamped.txt"),
            text: with_suffix(&prefix, "_text.txt"),
            prefix,
        }
    }
}

// Appended verbatim to the last component; not an extension.
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}
