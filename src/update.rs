//! Positional replacement of cue text with translated lines.

use tracing::{info, warn};

use crate::config::{ExcessLinePolicy, UpdateConfig};
use crate::error::{Result, SubgenError};
use crate::subtitle::SubtitleCue;

/// Outcome of applying a translation to a cue sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Cues whose content was replaced
    pub updated: usize,
    /// Cues that kept their content because the translated line was blank
    pub kept_original: usize,
    /// Translated lines beyond the last cue
    pub ignored_lines: usize,
}

/// Split translated text into per-cue lines.
///
/// The text arrives newline-terminated, so the last split segment is always
/// dropped, whether or not it is empty. A trailing `\r` is removed from every
/// remaining line.
pub fn translated_lines(translated_text: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = translated_text.split('\n').collect();
    segments.pop();
    segments
        .into_iter()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Replace each cue's content with the translated line at the same position.
///
/// Timing and indices are never touched. When there are fewer lines than
/// cues nothing is modified and a line count mismatch is returned.
pub fn update_cues(
    cues: &mut [SubtitleCue],
    translated_text: &str,
    config: &UpdateConfig,
) -> Result<UpdateSummary> {
    let lines = translated_lines(translated_text);

    if lines.is_empty() && !cues.is_empty() {
        return Err(SubgenError::EmptyTranslation);
    }
    if lines.len() < cues.len() {
        return Err(SubgenError::TranslationLineCountMismatch {
            expected: cues.len(),
            actual: lines.len(),
        });
    }

    let ignored_lines = lines.len() - cues.len();
    if ignored_lines > 0 {
        match config.excess_lines {
            ExcessLinePolicy::Warn => {
                warn!(
                    "Translation has {} lines for {} cues, ignoring the last {}",
                    lines.len(),
                    cues.len(),
                    ignored_lines
                );
            }
            ExcessLinePolicy::Error => {
                return Err(SubgenError::TranslationLineCountMismatch {
                    expected: cues.len(),
                    actual: lines.len(),
                });
            }
        }
    }

    let mut summary = UpdateSummary {
        ignored_lines,
        ..UpdateSummary::default()
    };

    for (cue, line) in cues.iter_mut().zip(lines) {
        let line = line.trim();
        if line.is_empty() {
            warn!("Translated line for cue {} is blank, keeping: {}", cue.index, cue.content);
            summary.kept_original += 1;
            continue;
        }
        cue.content = line.to_string();
        summary.updated += 1;
    }

    info!(
        "Updated {} cues ({} kept original text)",
        summary.updated, summary.kept_original
    );
    Ok(summary)
}
