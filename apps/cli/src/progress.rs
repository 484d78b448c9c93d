use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use ytscript_core::{PipelineEvent, Stage};

pub fn format_duration(d: Duration) -> String {
    if d.as_secs() < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .expect("spinner template is valid"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

struct Step {
    stage: Stage,
    spinner: ProgressBar,
    started: Instant,
    detail: Option<String>,
}

/// Turns pipeline events into spinners. Hidden when `enabled` is false.
pub struct Progress {
    enabled: bool,
    current: Option<Step>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: None,
        }
    }

    pub fn handle(&mut self, event: PipelineEvent) {
        if !self.enabled {
            return;
        }

        match event {
            PipelineEvent::StageStarted(stage) => {
                self.finish_step();
                if stage != Stage::Done {
                    self.current = Some(Step {
                        stage,
                        spinner: create_spinner(&format!("{stage}...")),
                        started: Instant::now(),
                        detail: None,
                    });
                }
            }
            PipelineEvent::MetadataResolved { video, paths } => {
                self.println(format!(
                    "  {} {}",
                    style(format!("{} ::", video.channel)).dim(),
                    style(&video.title).bold()
                ));
                self.println(format!(
                    "  {} {}",
                    style("Output prefix:").dim(),
                    paths.prefix.display()
                ));
            }
            PipelineEvent::DownloadLine(line) => {
                self.println(format!("   {}", style(line).dim()));
            }
            PipelineEvent::SubtitlesLocated(path) => {
                self.set_detail(style(path.display()).dim().to_string());
            }
            PipelineEvent::Rendered {
                entries,
                plain_text_chars,
            } => {
                self.set_detail(format!(
                    "{} lines, {} chars",
                    style(entries).yellow(),
                    style(plain_text_chars).yellow()
                ));
            }
        }
    }

    fn println(&self, line: String) {
        match &self.current {
            Some(step) => step.spinner.println(line),
            None => println!("{line}"),
        }
    }

    fn set_detail(&mut self, detail: String) {
        if let Some(step) = &mut self.current {
            step.detail = Some(detail);
        }
    }

    fn finish_step(&mut self) {
        let Some(step) = self.current.take() else {
            return;
        };
        let detail = step.detail.map(|d| format!(": {d}")).unwrap_or_default();
        step.spinner.finish_with_message(format!(
            "{} {}{} {}",
            style("✓").green().bold(),
            step.stage,
            detail,
            style(format!("[{}]", format_duration(step.started.elapsed()))).dim()
        ));
    }

    /// Close whatever is still spinning after the run ended.
    pub fn finish(&mut self) {
        self.finish_step();
    }

    /// Mark the in-flight step as failed.
    pub fn abandon(&mut self) {
        if let Some(step) = self.current.take() {
            step.spinner.abandon_with_message(format!(
                "{} {}",
                style("✗").red().bold(),
                step.stage
            ));
        }
    }
}
