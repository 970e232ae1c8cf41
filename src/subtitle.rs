use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubgenError};

/// One subtitle display unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// 1-based position in the cue sequence
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub content: String,
}

impl SubtitleCue {
    pub fn new<S: Into<String>>(index: usize, start: Duration, end: Duration, content: S) -> Self {
        Self {
            index,
            start,
            end,
            content: content.into(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Make cue text safe to place in a SubRip block.
///
/// A blank line terminates a block, so blank lines are removed and every
/// remaining line is trimmed. CRLF line endings become LF.
pub fn make_legal_content(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize cues to SubRip text
pub fn compose(cues: &[SubtitleCue]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            make_legal_content(&cue.content)
        ));
    }

    srt_content
}

/// Parse SubRip text into cues
pub fn parse(input: &str) -> Result<Vec<SubtitleCue>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.lines().enumerate().peekable();
    let mut cues = Vec::new();

    loop {
        // Skip blank separators between blocks
        while lines.peek().is_some_and(|(_, line)| line.trim().is_empty()) {
            lines.next();
        }

        let Some((line_no, index_line)) = lines.next() else {
            break;
        };

        let index: usize = index_line.trim().parse().map_err(|_| {
            SubgenError::SubtitleParse(format!(
                "line {}: expected cue index, found '{}'",
                line_no + 1,
                index_line.trim()
            ))
        })?;

        let (line_no, timing_line) = lines.next().ok_or_else(|| {
            SubgenError::SubtitleParse(format!("cue {}: missing timing line", index))
        })?;

        let (start, end) = timing_line.split_once("-->").ok_or_else(|| {
            SubgenError::SubtitleParse(format!(
                "line {}: expected 'start --> end', found '{}'",
                line_no + 1,
                timing_line.trim()
            ))
        })?;
        let start = parse_srt_time(start)?;
        // Position hints may follow the end timestamp
        let end = parse_srt_time(end.split_whitespace().next().unwrap_or_default())?;

        let mut content = Vec::new();
        while let Some(&(_, line)) = lines.peek() {
            if line.trim().is_empty() {
                break;
            }
            content.push(line.trim());
            lines.next();
        }

        cues.push(SubtitleCue::new(index, start, end, content.join("\n")));
    }

    Ok(cues)
}

/// Render cues as newline-terminated lines, one per cue.
///
/// This is the text handed to the translation service. Multi-line cue
/// content is folded onto one line so translated lines map back to cues by
/// position.
pub fn to_plain_text(cues: &[SubtitleCue]) -> String {
    let mut text = String::new();
    for cue in cues {
        text.push_str(&cue.content.lines().map(str::trim).collect::<Vec<_>>().join(" "));
        text.push('\n');
    }
    text
}

/// Write cues to a SubRip file
pub async fn write_srt<P: AsRef<Path>>(cues: &[SubtitleCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing {} subtitles to {}", cues.len(), output_path.display());

    fs::write(output_path, compose(cues)).await?;

    Ok(())
}

/// Read cues from a SubRip file
pub async fn read_srt<P: AsRef<Path>>(input_path: P) -> Result<Vec<SubtitleCue>> {
    let input_path = input_path.as_ref();
    if !input_path.exists() {
        return Err(SubgenError::FileNotFound(input_path.display().to_string()));
    }

    let content = fs::read_to_string(input_path).await?;
    parse(&content)
}

/// Write cue contents as newline-delimited text
pub async fn write_text<P: AsRef<Path>>(cues: &[SubtitleCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing {} subtitle lines to {}", cues.len(), output_path.display());

    fs::write(output_path, to_plain_text(cues)).await?;

    Ok(())
}

/// Format a timestamp in SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(time: Duration) -> String {
    let total_milliseconds = time.as_millis();
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp (HH:MM:SS,mmm). A '.' before the milliseconds is accepted too.
pub fn parse_srt_time(s: &str) -> Result<Duration> {
    let s = s.trim();
    let invalid = || SubgenError::SubtitleParse(format!("invalid timestamp '{}'", s));

    let mut parts = s.split(':');
    let (Some(hours), Some(minutes), Some(rest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let (secs, millis) = rest.split_once([',', '.']).ok_or_else(invalid)?;

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let secs: u64 = secs.parse().map_err(|_| invalid())?;
    let millis: u64 = millis.parse().map_err(|_| invalid())?;
    if minutes >= 60 || secs >= 60 || millis >= 1000 {
        return Err(invalid());
    }

    let total = hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + secs * 1_000 + millis))
        .ok_or_else(invalid)?;

    Ok(Duration::from_millis(total))
}
