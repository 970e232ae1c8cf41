// Translation collaborators
//
// Translators receive the subtitle text as newline-terminated lines, one per
// cue, and must return the same number of lines in the same order:
// - Ollama: line-by-line translation through a local LLM server
// - File: a translation prepared ahead of time

pub mod file;
pub mod ollama;

use async_trait::async_trait;
use std::path::PathBuf;

pub use file::FileTranslator;
pub use ollama::{check_ollama_availability, OllamaTranslator};

use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate newline-delimited text, keeping one output line per input line
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Use a prepared translation when one is given, otherwise Ollama
    pub fn create_translator(
        config: TranslateConfig,
        translation: Option<PathBuf>,
    ) -> Result<Box<dyn TextTranslator>> {
        match translation {
            Some(path) => Ok(Box::new(FileTranslator::new(path))),
            None => Ok(Box::new(OllamaTranslator::new(config)?)),
        }
    }
}
