use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "Invalid timing for word {word_index} ('{text}') in result {result_index}: start {start:?} is after end {end:?}"
    )]
    InvalidWordTiming {
        result_index: usize,
        word_index: usize,
        text: String,
        start: Duration,
        end: Duration,
    },

    #[error(
        "Word {word_index} ('{text}') in result {result_index} starts at {start:?}, before the previous word's start {previous_start:?}"
    )]
    NonMonotonicWords {
        result_index: usize,
        word_index: usize,
        text: String,
        start: Duration,
        previous_start: Duration,
    },

    #[error("Recognition result {result_index} has no words")]
    EmptyWords { result_index: usize },

    #[error("No recognition results to segment")]
    NoRecognitionResults,

    #[error("Translated text contains no lines")]
    EmptyTranslation,

    #[error("Translation line count mismatch: expected {expected} lines, got {actual}")]
    TranslationLineCountMismatch { expected: usize, actual: usize },

    #[error("Subtitle parse error: {0}")]
    SubtitleParse(String),

    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, SubgenError>;
