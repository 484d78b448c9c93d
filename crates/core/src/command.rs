use std::{ffi::OsString, io, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

/// The only way the pipeline talks to external programs.
///
/// Errors are reserved for processes that could not be started at all; a non-zero exit is
/// reported through [`CommandOutput::code`] and interpreted by the caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve `program` on PATH without spawning it. A miss is `ErrorKind::NotFound`.
    fn locate(&self, program: &str) -> io::Result<PathBuf>;

    /// Run to completion, capturing stdout and stderr.
    async fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput>;

    /// Run to completion with stderr discarded, returning trimmed stdout whatever the exit code.
    async fn run_quiet(&self, program: &str, args: &[OsString]) -> io::Result<String>;
}

/// [`CommandRunner`] backed by `tokio::process`.
///
/// Children are killed when the awaiting future is dropped, which is how cancellation reaches
/// a running download.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    fn command(program: &str, args: &[OsString]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    fn locate(&self, program: &str) -> io::Result<PathBuf> {
        which::which(program).map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
    }

    async fn run(&self, program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
        debug!(program, ?args, "spawning");
        let output = Self::command(program, args).output().await?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        })
    }

    async fn run_quiet(&self, program: &str, args: &[OsString]) -> io::Result<String> {
        debug!(program, ?args, "spawning (quiet)");
        // `output()` would force stderr back to a pipe.
        let child = Self::command(program, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let output = child.wait_with_output().await?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Render a command line for diagnostics.
pub fn display_command(program: &str, args: &[OsString]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let out = TokioCommandRunner
            .run("sh", &os_args(&["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn quiet_ignores_exit_code() {
        let out = TokioCommandRunner
            .run_quiet("sh", &os_args(&["-c", "echo '  listed  '; exit 1"]))
            .await
            .unwrap();
        assert_eq!(out, "listed");
    }

    #[test]
    fn locates_programs_on_path() {
        let sh = TokioCommandRunner.locate("sh").unwrap();
        assert!(sh.is_absolute());

        let err = TokioCommandRunner
            .locate("definitely-not-a-real-program-ytscript")
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let err = TokioCommandRunner
            .run("definitely-not-a-real-program-ytscript", &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn displays_command_line() {
        assert_eq!(
            display_command("yt-dlp", &os_args(&["--skip-download", "-o", "/tmp/x"])),
            "yt-dlp --skip-download -o /tmp/x"
        );
    }
}
