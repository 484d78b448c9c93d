use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    command::{CommandRunner, display_command},
    error::{Result, TranscriptError},
};

static PROGRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)downloading|writing|error").expect("progress pattern is valid"));

/// Title and channel as printed by a single metadata query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub title: String,
    pub channel: String,
}

/// Thin client over the `yt-dlp` command line.
pub struct YtDlp<R> {
    program: String,
    runner: R,
}

impl<R: CommandRunner> YtDlp<R> {
    pub fn new(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    fn spawn_error(&self, err: io::Error) -> TranscriptError {
        if err.kind() == io::ErrorKind::NotFound {
            TranscriptError::MissingDependency {
                program: self.program.clone(),
            }
        } else {
            TranscriptError::Io(err)
        }
    }

    /// Resolve the tool without running it, returning where it was found.
    pub fn check_available(&self) -> Result<PathBuf> {
        let path = self
            .runner
            .locate(&self.program)
            .map_err(|e| self.spawn_error(e))?;
        debug!(program = %self.program, path = %path.display(), "fetch tool available");
        Ok(path)
    }

    /// Query title and channel in one call. A failed query yields empty fields.
    pub async fn fetch_metadata(&self, url: &str) -> Result<RawMetadata> {
        let args = metadata_args(url);
        let stdout = self
            .runner
            .run_quiet(&self.program, &args)
            .await
            .map_err(|e| self.spawn_error(e))?;

        let mut lines = stdout.lines().map(str::trim);
        let metadata = RawMetadata {
            title: lines.next().unwrap_or_default().to_string(),
            channel: lines.next().unwrap_or_default().to_string(),
        };

        if metadata.title.is_empty() {
            warn!(url, "metadata query returned no title");
        }
        Ok(metadata)
    }

    /// Download the auto-generated track for `lang` next to `prefix`.
    ///
    /// Returns the output lines worth showing to a user.
    pub async fn download_subtitles(
        &self,
        url: &str,
        lang: &str,
        prefix: &Path,
    ) -> Result<Vec<String>> {
        let args = download_args(url, lang, prefix);
        let output = self
            .runner
            .run(&self.program, &args)
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.success() {
            return Err(TranscriptError::ExternalCommand {
                command: display_command(&self.program, &args),
                status: output.status_label(),
                stderr: output.stderr,
            });
        }

        Ok(progress_lines(&output.stdout))
    }

    /// Best-effort listing of available subtitle languages.
    pub async fn list_subtitles(&self, url: &str) -> Option<String> {
        let args = list_args(url);
        match self.runner.run_quiet(&self.program, &args).await {
            Ok(listing) if !listing.is_empty() => Some(listing),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "subtitle listing failed");
                None
            }
        }
    }
}

fn metadata_args(url: &str) -> Vec<OsString> {
    vec![
        "--print".into(),
        "%(title)s\n%(channel)s".into(),
        url.into(),
    ]
}

fn download_args(url: &str, lang: &str, prefix: &Path) -> Vec<OsString> {
    vec![
        "--write-auto-sub".into(),
        "--sub-lang".into(),
        lang.into(),
        "--sub-format".into(),
        "srt".into(),
        "--skip-download".into(),
        "-o".into(),
        prefix.into(),
        url.into(),
    ]
}

fn list_args(url: &str) -> Vec<OsString> {
    vec!["--list-subs".into(), "--skip-download".into(), url.into()]
}

/// Keep only download/write/error lines from the tool's chatter.
pub fn progress_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| PROGRESS_RE.is_match(line))
        .map(|line| line.trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_progress_noise() {
        let stdout = "[youtube] Extracting URL: https://youtu.be/x\n\
                      [youtube] abc: Downloading webpage\n\
                      [info] abc: Writing video subtitles to: /tmp/a.en.srt\n\
                      [info] skipping\n\
                      ERROR: something broke\n";
        assert_eq!(
            progress_lines(stdout),
            vec![
                "[youtube] abc: Downloading webpage",
                "[info] abc: Writing video subtitles to: /tmp/a.en.srt",
                "ERROR: something broke",
            ]
        );
    }

    #[test]
    fn download_args_order() {
        let args = download_args("https://youtu.be/x", "fr", &PathBuf::from("/out/id-title"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "--write-auto-sub",
                "--sub-lang",
                "fr",
                "--sub-format",
                "srt",
                "--skip-download",
                "-o",
                "/out/id-title",
                "https://youtu.be/x",
            ]
        );
    }

    #[test]
    fn metadata_template_uses_newline_separator() {
        let args = metadata_args("u");
        assert_eq!(args[1], OsString::from("%(title)s\n%(channel)s"));
    }
}
