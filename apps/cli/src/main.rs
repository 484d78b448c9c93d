use std::{path::PathBuf, time::Instant};

use anyhow::Result;
use clap::{ArgAction, Parser};
use console::style;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use ytscript_core::{
    DEFAULT_LANG, DEFAULT_YT_DLP, Pipeline, TokioCommandRunner, TranscriptError, TranscriptReport,
    TranscriptRequest, YtDlp, default_output_dir,
};

use crate::progress::{Progress, format_duration};

mod progress;

#[derive(Parser)]
#[command(name = "yt-transcript")]
#[command(
    about = "Download YouTube auto-generated subtitles and turn them into plain-text transcripts"
)]
struct Cli {
    /// Video URL (watch, embed, shorts or youtu.be link)
    url: String,

    /// Output directory. Defaults to <temp dir>/yt-transcript.
    #[arg(env = "YT_TRANSCRIPT_DIR")]
    output_dir: Option<PathBuf>,

    /// Subtitle language code (e.g. "en", "fr", "uk")
    #[arg(short, long, env = "YT_TRANSCRIPT_LANG", default_value = DEFAULT_LANG)]
    lang: String,

    /// yt-dlp executable to invoke
    #[arg(long = "yt-dlp", env = "YT_DLP_PATH", default_value = DEFAULT_YT_DLP)]
    yt_dlp: String,

    /// Print the run report as JSON instead of the human-readable summary
    #[arg(long)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(report: &TranscriptReport, elapsed: std::time::Duration) {
    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(elapsed)).cyan().bold()
    );
    println!("{}", style("Output files:").bold());
    let files = [
        (&report.paths.subtitles, "Original SRT subtitles"),
        (&report.paths.timestamped, "Transcript with timestamps"),
        (&report.paths.text, "Plain text transcript"),
    ];
    for (path, what) in files {
        println!(
            "   {}  {}",
            style(path.display()).cyan(),
            style(format!("- {what}")).dim()
        );
    }
}

/// Process exit status for a failed run.
fn exit_code(err: &TranscriptError) -> i32 {
    match err {
        TranscriptError::Cancelled => 130,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let request = TranscriptRequest::new(&cli.url)
        .with_lang(&cli.lang)
        .with_output_dir(cli.output_dir.unwrap_or_else(default_output_dir));
    debug!(
        url = %request.url,
        lang = %request.lang,
        output_dir = %request.output_dir.display(),
        "starting run"
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let pipeline =
        Pipeline::new(YtDlp::new(&cli.yt_dlp, TokioCommandRunner)).with_events(events_tx);

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let mut progress = Progress::new(!cli.json);
    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("yt-transcript").cyan().bold(),
            style(format!("{} [{}]", request.url, request.lang)).dim()
        );
    }

    let started = Instant::now();
    let run = pipeline.run_until_shutdown(&request, shutdown_rx);
    tokio::pin!(run);

    let result = loop {
        tokio::select! {
            Some(event) = events_rx.recv() => progress.handle(event),
            result = &mut run => break result,
        }
    };
    while let Ok(event) = events_rx.try_recv() {
        progress.handle(event);
    }

    match result {
        Ok(report) => {
            progress.finish();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report, started.elapsed());
            }
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            match &e {
                TranscriptError::Cancelled => {
                    eprintln!("{} interrupted", style("Cancelled:").yellow().bold());
                }
                TranscriptError::MissingDependency { .. } => {
                    eprintln!("{} {}", style("Error:").red().bold(), e);
                    eprintln!("Install it with: pipx install yt-dlp");
                }
                _ => eprintln!("{} {}", style("Error:").red().bold(), e),
            }
            std::process::exit(exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_exit_non_zero() {
        let failures = [
            TranscriptError::SubtitlesUnavailable {
                lang: "xx".into(),
                available: None,
            },
            TranscriptError::ExternalCommand {
                command: "yt-dlp --write-auto-sub".into(),
                status: "1".into(),
                stderr: "ERROR: Video unavailable".into(),
            },
            TranscriptError::MissingDependency {
                program: "yt-dlp".into(),
            },
            TranscriptError::InvalidUrl {
                url: "https://vimeo.com/1".into(),
            },
        ];
        for err in &failures {
            assert_eq!(exit_code(err), 1, "{err}");
        }
    }

    #[test]
    fn cancellation_exits_like_sigint() {
        assert_eq!(exit_code(&TranscriptError::Cancelled), 130);
    }
}
