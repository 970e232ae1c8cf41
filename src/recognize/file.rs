use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, SubgenError};
use crate::segment::RecognitionResult;
use super::{parse_response, RecognitionRequest, SpeechRecognizer};

/// Recognizer backed by a previously saved recognize response
pub struct TranscriptFileRecognizer {
    path: PathBuf,
}

impl TranscriptFileRecognizer {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SpeechRecognizer for TranscriptFileRecognizer {
    async fn recognize(
        &self,
        audio_path: &Path,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionResult>> {
        if !self.path.exists() {
            return Err(SubgenError::FileNotFound(self.path.display().to_string()));
        }

        info!(
            "Using saved transcript {} for {} ({})",
            self.path.display(),
            audio_path.display(),
            request.language_code
        );

        let content = tokio::fs::read_to_string(&self.path).await?;
        let results = parse_response(&content)?;

        info!("Loaded {} recognition results", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecognitionRequest {
        RecognitionRequest {
            language_code: "de_DE".to_string(),
            channels: 2,
            sample_rate: 44_100,
        }
    }

    #[tokio::test]
    async fn test_reads_saved_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de.json");
        std::fs::write(
            &path,
            r#"{"results":[{"alternatives":[{"words":[{"word":"Hallo.","endTime":"0.4s"}]}]}]}"#,
        )
        .unwrap();

        let recognizer = TranscriptFileRecognizer::new(&path);
        let results = recognizer.recognize(Path::new("audio.wav"), &request()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].top().unwrap().words[0].text, "Hallo.");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let recognizer = TranscriptFileRecognizer::new("/nonexistent/response.json");
        let result = recognizer.recognize(Path::new("audio.wav"), &request()).await;

        assert!(matches!(result, Err(SubgenError::FileNotFound(_))));
    }
}
