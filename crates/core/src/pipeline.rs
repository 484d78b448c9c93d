use std::{fmt, path::PathBuf};

use serde::Serialize;
use tokio::{
    fs,
    sync::{broadcast, mpsc},
};
use tracing::{debug, info};

use crate::{
    command::CommandRunner,
    config::TranscriptRequest,
    error::{Result, TranscriptError},
    format::{format_plain_text, format_timestamped},
    output::OutputPaths,
    srt::parse_srt,
    video::{VideoMetadata, extract_video_id},
    ytdlp::YtDlp,
};

/// Linear run states. Any `Err` out of [`Pipeline::run`] is the failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveMetadata,
    DownloadSubtitles,
    LocateFile,
    ParseAndRender,
    Persist,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::ResolveMetadata => "Resolving metadata",
            Stage::DownloadSubtitles => "Downloading subtitles",
            Stage::LocateFile => "Locating subtitle file",
            Stage::ParseAndRender => "Processing transcript",
            Stage::Persist => "Writing transcripts",
            Stage::Done => "Done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StageStarted(Stage),
    MetadataResolved {
        video: VideoMetadata,
        paths: OutputPaths,
    },
    /// A download/write/error line from the fetch tool.
    DownloadLine(String),
    SubtitlesLocated(PathBuf),
    Rendered {
        entries: usize,
        plain_text_chars: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    pub video: VideoMetadata,
    pub lang: String,
    pub paths: OutputPaths,
    pub entry_count: usize,
    pub plain_text_chars: usize,
}

pub struct Pipeline<R> {
    ytdlp: YtDlp<R>,
    events: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(ytdlp: YtDlp<R>) -> Self {
        Self {
            ytdlp,
            events: None,
        }
    }

    /// Publish progress on `tx`. A dropped receiver is ignored.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn enter(&self, stage: Stage) {
        debug!(%stage, "entering stage");
        self.emit(PipelineEvent::StageStarted(stage));
    }

    pub async fn run(&self, request: &TranscriptRequest) -> Result<TranscriptReport> {
        self.ytdlp.check_available()?;

        self.enter(Stage::ResolveMetadata);
        let id = extract_video_id(&request.url)?;
        let raw = self.ytdlp.fetch_metadata(&request.url).await?;
        let video = VideoMetadata {
            id,
            title: raw.title,
            channel: raw.channel,
            source_url: request.url.clone(),
        };
        let paths = OutputPaths::new(&request.output_dir, &video.id, &video.title, &request.lang);
        info!(id = %video.id, prefix = %paths.prefix.display(), "resolved video");
        self.emit(PipelineEvent::MetadataResolved {
            video: video.clone(),
            paths: paths.clone(),
        });

        self.enter(Stage::DownloadSubtitles);
        fs::create_dir_all(&request.output_dir).await?;
        let lines = self
            .ytdlp
            .download_subtitles(&request.url, &request.lang, &paths.prefix)
            .await?;
        for line in lines {
            self.emit(PipelineEvent::DownloadLine(line));
        }

        self.enter(Stage::LocateFile);
        if !fs::try_exists(&paths.subtitles).await? {
            let available = self.ytdlp.list_subtitles(&request.url).await;
            return Err(TranscriptError::SubtitlesUnavailable {
                lang: request.lang.clone(),
                available,
            });
        }
        self.emit(PipelineEvent::SubtitlesLocated(paths.subtitles.clone()));

        self.enter(Stage::ParseAndRender);
        let raw_srt = fs::read(&paths.subtitles).await?;
        let content = String::from_utf8_lossy(&raw_srt);
        let entries = parse_srt(&content);
        let timestamped = format_timestamped(&video, &entries);
        let plain = format_plain_text(&video, &entries);
        let plain_text_chars = plain.chars().count();
        info!(entries = entries.len(), "parsed subtitles");
        self.emit(PipelineEvent::Rendered {
            entries: entries.len(),
            plain_text_chars,
        });

        self.enter(Stage::Persist);
        tokio::try_join!(
            fs::write(&paths.timestamped, &timestamped),
            fs::write(&paths.text, &plain)
        )?;

        self.enter(Stage::Done);
        Ok(TranscriptReport {
            video,
            lang: request.lang.clone(),
            paths,
            entry_count: entries.len(),
            plain_text_chars,
        })
    }

    /// Like [`Pipeline::run`], but gives up with [`TranscriptError::Cancelled`] once `shutdown`
    /// fires. Dropping the in-flight run kills any running subprocess.
    pub async fn run_until_shutdown(
        &self,
        request: &TranscriptRequest,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<TranscriptReport> {
        let cancelled = async move {
            // A closed channel means nobody can cancel anymore.
            if let Err(broadcast::error::RecvError::Closed) = shutdown.recv().await {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = cancelled => Err(TranscriptError::Cancelled),
            result = self.run(request) => result,
        }
    }
}
