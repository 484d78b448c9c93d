use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer, ser::SerializeStruct};
use tracing::trace;

// Sub-second fractions are matched but not captured.
static TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2})(?:,\d+)?\s*-->\s*(\d{2}):(\d{2}):(\d{2})(?:,\d+)?")
        .expect("timing pattern is valid")
});

static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("blank line pattern is valid"));

/// Whole-second offset into a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Timestamp {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn as_secs(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

impl CaptionEntry {
    pub fn start_ts(&self) -> String {
        self.start.to_string()
    }

    pub fn end_ts(&self) -> String {
        self.end.to_string()
    }

    pub fn start_sec(&self) -> u64 {
        self.start.as_secs()
    }

    pub fn end_sec(&self) -> u64 {
        self.end.as_secs()
    }
}

impl Serialize for CaptionEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CaptionEntry", 5)?;
        s.serialize_field("startTs", &self.start_ts())?;
        s.serialize_field("endTs", &self.end_ts())?;
        s.serialize_field("startSec", &self.start_sec())?;
        s.serialize_field("endSec", &self.end_sec())?;
        s.serialize_field("text", &self.text)?;
        s.end()
    }
}

/// Parse SRT content into caption entries, in file order.
///
/// Auto-generated subtitles regularly contain blocks with broken timing or no text. Those
/// blocks are skipped, never reported as errors, so a fully malformed file yields an empty
/// list. A leading byte order mark is ignored.
pub fn parse_srt(content: &str) -> Vec<CaptionEntry> {
    let content = content.trim_start_matches('\u{feff}');
    BLANK_LINES_RE
        .split(content.trim())
        .enumerate()
        .filter_map(|(idx, block)| {
            let entry = parse_block(block);
            if entry.is_none() {
                trace!(block = idx, "skipping subtitle block");
            }
            entry
        })
        .collect()
}

fn parse_block(block: &str) -> Option<CaptionEntry> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() < 2 {
        return None;
    }

    let mut timing_line = None;
    let mut text_lines = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.contains("-->") {
            timing_line = Some(line);
        } else if is_index_line(line) || line.is_empty() {
            continue;
        } else {
            text_lines.push(line);
        }
    }

    if text_lines.is_empty() {
        return None;
    }

    let (start, end) = parse_timing(timing_line?)?;
    if end < start {
        return None;
    }

    Some(CaptionEntry {
        start,
        end,
        text: text_lines.join(" "),
    })
}

fn is_index_line(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

fn parse_timing(line: &str) -> Option<(Timestamp, Timestamp)> {
    let caps = TIMING_RE.captures(line)?;
    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    Some((
        Timestamp::new(field(1)?, field(2)?, field(3)?),
        Timestamp::new(field(4)?, field(5)?, field(6)?),
    ))
}
