use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::RecognizerConfig;
use crate::error::{Result, SubgenError};
use crate::segment::RecognitionResult;
use super::{parse_response, RecognitionRequest, SpeechRecognizer};

/// Recognizer that runs an external program and reads its response from stdout
pub struct CommandRecognizer {
    config: RecognizerConfig,
}

impl CommandRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    /// Fill the argument template for one recognition request
    pub fn render_args(&self, audio_path: &Path, request: &RecognitionRequest) -> Vec<String> {
        let audio = audio_path.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{audio}", &audio)
                    .replace("{language}", &request.language_code)
                    .replace("{channels}", &request.channels.to_string())
                    .replace("{sample_rate}", &request.sample_rate.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(
        &self,
        audio_path: &Path,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionResult>> {
        info!(
            "Recognizing speech in {} ({}, {} channels, {} Hz)",
            audio_path.display(),
            request.language_code,
            request.channels,
            request.sample_rate
        );

        let args = self.render_args(audio_path, request);
        debug!("Executing recognizer: {} {:?}", self.config.binary_path, args);

        let output = Command::new(&self.config.binary_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| SubgenError::Recognition(format!("Failed to execute recognizer: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubgenError::Recognition(format!(
                "Recognizer exited with {}: {}",
                output.status, stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let results = parse_response(&stdout)?;

        info!("Transcribing finished: {} recognition results", results.len());
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
            sample_rate: 48_000,
        }
    }

    #[test]
    fn test_render_args() {
        let recognizer = CommandRecognizer::new(RecognizerConfig::default());
        let args = recognizer.render_args(Path::new("/tmp/audio.wav"), &request());

        assert_eq!(
            args,
            vec!["--language", "de_DE", "--channels", "2", "--sample-rate", "48000", "/tmp/audio.wav"]
        );
    }

    #[test]
    fn test_render_args_inside_larger_argument() {
        let recognizer = CommandRecognizer::new(RecognizerConfig {
            binary_path: "stt".to_string(),
            args: vec!["--input={audio}".to_string(), "lang:{language}".to_string()],
        });
        let args = recognizer.render_args(Path::new("a.wav"), &request());

        assert_eq!(args, vec!["--input=a.wav", "lang:de_DE"]);
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let recognizer = CommandRecognizer::new(RecognizerConfig {
            binary_path: "/nonexistent/recognizer".to_string(),
            args: vec![],
        });
        let result = recognizer.recognize(Path::new("a.wav"), &request()).await;

        assert!(matches!(result, Err(SubgenError::Recognition(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_parses_program_output() {
        let recognizer = CommandRecognizer::new(RecognizerConfig {
            binary_path: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r#"printf '{"results":[{"alternatives":[{"words":[{"word":"Hallo.","endTime":"0.5s"}]}]}]}'"#
                    .to_string(),
            ],
        });
        let results = recognizer.recognize(Path::new("a.wav"), &request()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].top().unwrap().words[0].text, "Hallo.");
    }
}
