//! Fake `yt-dlp` for pipeline tests.

#![allow(dead_code)]

use std::{
    ffi::OsString,
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Notify;
use ytscript_core::{CommandOutput, CommandRunner};

pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:03,500
hello world

2
00:00:03,500 --> 00:00:06,000
this is
a test

3
00:00:06,000 --> 00:00:07,000

4
00:00:07,000 --> 00:00:09,250
  goodbye   now
";

#[derive(Clone)]
pub enum Download {
    /// Exit 0 and write this content to `<prefix>.<lang>.srt`.
    Writes(String),
    /// Exit 0 without producing a file.
    NoFile,
    Fails { code: i32, stderr: String },
    /// Never finishes.
    Hangs,
}

#[derive(Clone)]
pub struct FakeYtDlp {
    pub installed: bool,
    pub metadata: String,
    pub download: Download,
    pub listing: Option<String>,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
    pub download_started: Arc<Notify>,
}

impl FakeYtDlp {
    pub fn new() -> Self {
        Self {
            installed: true,
            metadata: "Never Gonna Give You Up\nRick Astley".to_string(),
            download: Download::Writes(SAMPLE_SRT.to_string()),
            listing: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            download_started: Arc::new(Notify::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn first_flags(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.first().cloned().unwrap_or_default())
            .collect()
    }

    fn record(&self, args: &[OsString]) -> io::Result<Vec<String>> {
        if !self.installed {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        }
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls.lock().unwrap().push(args.clone());
        Ok(args)
    }
}

fn value_after(args: &[String], flag: &str) -> String {
    let idx = args.iter().position(|a| a == flag).unwrap();
    args[idx + 1].clone()
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        code: Some(0),
    }
}

#[async_trait]
impl CommandRunner for FakeYtDlp {
    fn locate(&self, program: &str) -> io::Result<PathBuf> {
        if self.installed {
            Ok(PathBuf::from("/usr/bin").join(program))
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "not on PATH"))
        }
    }

    async fn run(&self, _program: &str, args: &[OsString]) -> io::Result<CommandOutput> {
        let args = self.record(args)?;
        match args[0].as_str() {
            "--write-auto-sub" => match &self.download {
                Download::Writes(content) => {
                    let prefix = value_after(&args, "-o");
                    let lang = value_after(&args, "--sub-lang");
                    let path = PathBuf::from(format!("{prefix}.{lang}.srt"));
                    std::fs::write(&path, content)?;
                    Ok(ok(&format!(
                        "[youtube] dQw4w9WgXcQ: Downloading webpage\n\
                         [youtube] dQw4w9WgXcQ: Extracting player\n\
                         [info] Writing video subtitles to: {}\n",
                        path.display()
                    )))
                }
                Download::NoFile => Ok(ok("[info] There are no subtitles for the requested languages\n")),
                Download::Fails { code, stderr } => Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: stderr.clone(),
                    code: Some(*code),
                }),
                Download::Hangs => {
                    self.download_started.notify_one();
                    std::future::pending().await
                }
            },
            other => panic!("unexpected run: {other}"),
        }
    }

    async fn run_quiet(&self, _program: &str, args: &[OsString]) -> io::Result<String> {
        let args = self.record(args)?;
        match args[0].as_str() {
            "--print" => Ok(self.metadata.trim().to_string()),
            "--list-subs" => self
                .listing
                .clone()
                .ok_or_else(|| io::Error::other("listing failed")),
            other => panic!("unexpected quiet run: {other}"),
        }
    }
}
