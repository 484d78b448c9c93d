use crate::{srt::CaptionEntry, video::VideoMetadata};

fn header(video: &VideoMetadata) -> String {
    format!(
        "# {} :: {}\n# {}\n\n",
        video.channel, video.title, video.source_url
    )
}

/// Format entries as `HH:MM:SS-HH:MM:SS text` lines under the video header
pub fn format_timestamped(video: &VideoMetadata, entries: &[CaptionEntry]) -> String {
    let body = entries
        .iter()
        .map(|e| format!("{}-{} {}", e.start, e.end, e.text))
        .collect::<Vec<_>>()
        .join("\n");

    header(video) + &body
}

/// Format entries as a single whitespace-normalized paragraph under the video header
pub fn format_plain_text(video: &VideoMetadata, entries: &[CaptionEntry]) -> String {
    let body = entries
        .iter()
        .flat_map(|e| e.text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    header(video) + &body
}
