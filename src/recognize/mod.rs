// Speech recognition collaborators
//
// Recognizers turn an audio file into word-timed recognition results in the
// order the service returned them:
// - TranscriptFile: reads a recognize response saved to disk
// - Command: runs an external recognizer that prints the response on stdout
//
// Both speak the service's JSON response format (see response.rs).

pub mod command;
pub mod file;
pub mod response;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use command::CommandRecognizer;
pub use file::TranscriptFileRecognizer;
pub use response::parse_response;

use crate::config::RecognizerConfig;
use crate::error::Result;
use crate::segment::RecognitionResult;

/// Audio parameters and language passed to the recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    /// BCP-47 style language code, e.g. "de_DE"
    pub language_code: String,
    pub channels: u32,
    pub sample_rate: u32,
}

/// Main trait for speech recognition
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize speech with word time offsets
    async fn recognize(
        &self,
        audio_path: &Path,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionResult>>;
}

/// Factory for creating recognizer instances
pub struct RecognizerFactory;

impl RecognizerFactory {
    /// Use a saved response when one is given, otherwise the configured command
    pub fn create_recognizer(
        config: RecognizerConfig,
        transcript: Option<PathBuf>,
    ) -> Box<dyn SpeechRecognizer> {
        match transcript {
            Some(path) => Box::new(TranscriptFileRecognizer::new(path)),
            None => Box::new(CommandRecognizer::new(config)),
        }
    }
}
