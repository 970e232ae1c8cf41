// Media processing over external encoder binaries
//
// - Commands: command builders for ffmpeg and ffprobe
// - Probe: parsing of ffprobe's stream report
// - Processor: the ffmpeg-backed MediaProcessor

pub mod commands;
pub mod probe;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use probe::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Read channel count, sample rate and bit rate of the first audio stream
    async fn probe_audio(&self, video_path: &Path) -> Result<AudioInfo>;

    /// Extract the audio track, keeping the probed parameters
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path, info: &AudioInfo) -> Result<()>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessor> {
        Box::new(FfmpegProcessor::new(config))
    }
}
