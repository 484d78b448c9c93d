use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("{program} is not installed or not on PATH")]
    MissingDependency { program: String },

    #[error("Could not extract video ID from: {url}")]
    InvalidUrl { url: String },

    #[error("No subtitles found for language '{lang}'{}", available_suffix(.available))]
    SubtitlesUnavailable {
        lang: String,
        available: Option<String>,
    },

    #[error("Command failed ({status}): {command}\n{stderr}")]
    ExternalCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn available_suffix(available: &Option<String>) -> String {
    match available {
        Some(listing) => format!("\n\nAvailable subtitles:\n{listing}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
