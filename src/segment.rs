//! Word-timed transcript to subtitle cue segmentation.
//!
//! Recognized words are accumulated into a cue until a word carries terminal
//! punctuation, the cue grows past the configured character budget, or a word
//! after the first one carries clause punctuation. Cues keep one running
//! index across all recognition results of a transcript.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{SegmenterConfig, TrailingCuePolicy};
use crate::error::{Result, SubgenError};
use crate::subtitle::{make_legal_content, SubtitleCue};

/// A recognized token with its timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: Duration,
    pub end: Duration,
}

impl Word {
    pub fn new<S: Into<String>>(text: S, start: Duration, end: Duration) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// One candidate transcription of an audio segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
    pub words: Vec<Word>,
}

/// Recognition output for one audio segment, most probable alternative first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub alternatives: Vec<Alternative>,
}

impl RecognitionResult {
    pub fn from_words(words: Vec<Word>) -> Self {
        Self {
            alternatives: vec![Alternative {
                transcript: words.iter().map(|w| w.text.trim()).collect::<Vec<_>>().join(" "),
                confidence: None,
                words,
            }],
        }
    }

    /// The most probable alternative
    pub fn top(&self) -> Option<&Alternative> {
        self.alternatives.first()
    }
}

/// Cues produced so far, carrying the running index between results
#[derive(Debug, Clone, Default)]
pub struct CueSequence {
    cues: Vec<SubtitleCue>,
}

impl CueSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next emitted cue will receive
    pub fn next_index(&self) -> usize {
        self.cues.len() + 1
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn into_cues(self) -> Vec<SubtitleCue> {
        self.cues
    }

    fn push(&mut self, start: Duration, end: Duration, content: &str) {
        let content = make_legal_content(content);
        if content.is_empty() {
            warn!("Skipping cue {:?}-{:?} with no visible text", start, end);
            return;
        }
        if end == start {
            warn!("Cue {} has zero duration at {:?}: {}", self.next_index(), start, content);
        }

        let cue = SubtitleCue::new(self.next_index(), start, end, content);
        debug!("Cue {}: {:?} -> {:?} {}", cue.index, cue.start, cue.end, cue.content);
        self.cues.push(cue);
    }
}

/// Words gathered for the cue currently being built
#[derive(Debug, Default)]
struct PendingCue {
    start: Duration,
    end: Duration,
    char_count: usize,
    content: String,
    words: usize,
}

impl PendingCue {
    fn is_empty(&self) -> bool {
        self.words == 0
    }
}

pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment a complete batch of recognition results into cues
    pub fn segment(&self, results: &[RecognitionResult]) -> Result<Vec<SubtitleCue>> {
        if results.is_empty() {
            return Err(SubgenError::NoRecognitionResults);
        }

        let mut cues = CueSequence::new();
        for (result_index, result) in results.iter().enumerate() {
            cues = self.break_sentences(cues, result_index, result)?;
        }

        debug!("Segmented {} results into {} cues", results.len(), cues.len());
        Ok(cues.into_cues())
    }

    /// Append the cues of one result to `cues`, continuing its index
    pub fn break_sentences(
        &self,
        mut cues: CueSequence,
        result_index: usize,
        result: &RecognitionResult,
    ) -> Result<CueSequence> {
        let words = validated_words(result_index, result)?;
        let mut pending = PendingCue::default();

        for word in words {
            let first_word = pending.is_empty();
            if first_word {
                pending.start = word.start;
            }

            pending.char_count += word.text.chars().count();
            pending.content.push(' ');
            pending.content.push_str(word.text.trim());
            pending.end = word.end;
            pending.words += 1;

            if self.ends_cue(&word.text, pending.char_count, first_word) {
                cues.push(pending.start, word.end, &pending.content);
                pending = PendingCue::default();
            }
        }

        if !pending.is_empty() {
            match self.config.trailing_cue {
                TrailingCuePolicy::Emit => {
                    debug!("Result {} ended mid-cue, emitting the remaining words", result_index);
                    cues.push(pending.start, pending.end, &pending.content);
                }
                TrailingCuePolicy::Drop => {
                    warn!(
                        "Dropping unterminated cue {:?}-{:?} at end of result {}: {}",
                        pending.start,
                        pending.end,
                        result_index,
                        pending.content.trim()
                    );
                }
            }
        }

        Ok(cues)
    }

    fn ends_cue(&self, text: &str, char_count: usize, first_word: bool) -> bool {
        contains_any(text, &self.config.terminal_punctuation)
            || char_count > self.config.max_chars
            || (contains_any(text, &self.config.clause_punctuation) && !first_word)
    }
}

fn contains_any(text: &str, set: &[char]) -> bool {
    text.contains(|c: char| set.contains(&c))
}

/// Words of the top alternative, checked for usable timing
fn validated_words(result_index: usize, result: &RecognitionResult) -> Result<&[Word]> {
    let words = match result.top() {
        Some(alternative) if !alternative.words.is_empty() => &alternative.words[..],
        _ => return Err(SubgenError::EmptyWords { result_index }),
    };

    let mut previous_start: Option<Duration> = None;
    for (word_index, word) in words.iter().enumerate() {
        if word.start > word.end {
            return Err(SubgenError::InvalidWordTiming {
                result_index,
                word_index,
                text: word.text.clone(),
                start: word.start,
                end: word.end,
            });
        }
        if let Some(previous_start) = previous_start {
            if word.start < previous_start {
                return Err(SubgenError::NonMonotonicWords {
                    result_index,
                    word_index,
                    text: word.text.clone(),
                    start: word.start,
                    previous_start,
                });
            }
        }
        previous_start = Some(word.start);
    }

    Ok(words)
}
