use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SubgenError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub segmenter: SegmenterConfig,
    pub update: UpdateConfig,
    pub media: MediaConfig,
    pub recognizer: RecognizerConfig,
    pub translate: TranslateConfig,
    pub storage: StorageConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// A cue ends once its running character count exceeds this value
    pub max_chars: usize,
    /// Characters that always end a cue
    pub terminal_punctuation: Vec<char>,
    /// Characters that end a cue unless they appear in the cue's first word
    pub clause_punctuation: Vec<char>,
    /// What to do with words left over when a result ends mid-cue
    pub trailing_cue: TrailingCuePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailingCuePolicy {
    /// Emit the leftover words as a final cue ending at the last word
    Emit,
    /// Discard the leftover words and log a warning
    Drop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Handling of translated lines beyond the number of cues
    pub excess_lines: ExcessLinePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcessLinePolicy {
    /// Ignore the extra lines after logging how many were dropped
    Warn,
    /// Fail with a line count mismatch
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// External recognizer program printing a recognize response as JSON
    pub binary_path: String,
    /// Argument template; supports {audio}, {language}, {channels} and {sample_rate}
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// Maximum retries for failed translations
    pub max_retries: u32,
    /// Delay before the first retry (seconds)
    pub initial_retry_delay: f64,
    /// Multiplier applied to the delay after every retry
    pub backoff_factor: f64,
    /// Request timeout (seconds)
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory standing in for the storage bucket
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Working directory for downloaded and intermediate files; a fresh
    /// temporary directory per run when unset
    pub work_dir: Option<PathBuf>,
    /// Keep intermediate files instead of cleaning them up
    pub keep_intermediate: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chars: 40,
            terminal_punctuation: vec!['.', '!', '?'],
            clause_punctuation: vec![','],
            trailing_cue: TrailingCuePolicy::Emit,
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            excess_lines: ExcessLinePolicy::Warn,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            binary_path: "recognize".to_string(),
            args: vec![
                "--language".to_string(), "{language}".to_string(),
                "--channels".to_string(), "{channels}".to_string(),
                "--sample-rate".to_string(), "{sample_rate}".to_string(),
                "{audio}".to_string(),
            ],
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            max_retries: 3,
            initial_retry_delay: 10.0,
            backoff_factor: 1.1,
            timeout: 300,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".subgen/bucket"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubgenError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SubgenError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubgenError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubgenError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.segmenter.max_chars == 0 {
            return Err(SubgenError::Config("segmenter.max_chars must be greater than 0".to_string()));
        }
        if self.translate.backoff_factor < 1.0 {
            return Err(SubgenError::Config(format!(
                "translate.backoff_factor must be at least 1.0, got {}",
                self.translate.backoff_factor
            )));
        }
        if self.translate.initial_retry_delay < 0.0 {
            return Err(SubgenError::Config("translate.initial_retry_delay must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_segmentation_policy() {
        let config = Config::default();
        assert_eq!(config.segmenter.max_chars, 40);
        assert_eq!(config.segmenter.terminal_punctuation, vec!['.', '!', '?']);
        assert_eq!(config.segmenter.clause_punctuation, vec![',']);
        assert_eq!(config.segmenter.trailing_cue, TrailingCuePolicy::Emit);
        assert_eq!(config.update.excess_lines, ExcessLinePolicy::Warn);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [segmenter]
            max_chars = 32
            trailing_cue = "Drop"

            [translate]
            model = "qwen2.5:7b"
            "#,
        )
        .unwrap();

        assert_eq!(config.segmenter.max_chars, 32);
        assert_eq!(config.segmenter.trailing_cue, TrailingCuePolicy::Drop);
        assert_eq!(config.segmenter.terminal_punctuation, vec!['.', '!', '?']);
        assert_eq!(config.translate.model, "qwen2.5:7b");
        assert_eq!(config.translate.max_retries, 3);
        assert_eq!(config.media.binary_path, "ffmpeg");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgen.toml");

        let mut config = Config::default();
        config.update.excess_lines = ExcessLinePolicy::Error;
        config.workflow.keep_intermediate = true;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.update.excess_lines, ExcessLinePolicy::Error);
        assert!(loaded.workflow.keep_intermediate);
        assert_eq!(loaded.storage.root, config.storage.root);
    }

    #[test]
    fn test_rejects_zero_max_chars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subgen.toml");
        std::fs::write(&path, "[segmenter]\nmax_chars = 0\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(SubgenError::Config(_))));
    }
}
