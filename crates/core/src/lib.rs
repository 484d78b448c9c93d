//! ytscript core library
//!
//! Fetches auto-generated YouTube subtitles through `yt-dlp` and turns them into a
//! timestamped transcript and a plain-text transcript.

pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod output;
pub mod pipeline;
pub mod sanitize;
pub mod srt;
pub mod video;
pub mod ytdlp;

pub use command::{CommandOutput, CommandRunner, TokioCommandRunner};
pub use config::{DEFAULT_LANG, DEFAULT_YT_DLP, TranscriptRequest, default_output_dir};
pub use error::{Result, TranscriptError};
pub use format::{format_plain_text, format_timestamped};
pub use output::OutputPaths;
pub use pipeline::{Pipeline, PipelineEvent, Stage, TranscriptReport};
pub use sanitize::sanitize_title;
pub use srt::{CaptionEntry, Timestamp, parse_srt};
pub use video::{VideoMetadata, extract_video_id};
pub use ytdlp::YtDlp;
