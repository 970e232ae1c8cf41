use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::Result;
use super::{parse_probe_output, AudioInfo, MediaCommandBuilder, MediaProcessor};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct FfmpegProcessor {
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            command_builder: MediaCommandBuilder::new(config.binary_path, config.probe_path),
        }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn probe_audio(&self, video_path: &Path) -> Result<AudioInfo> {
        let output = self.command_builder.probe_streams(video_path).execute_capture().await?;
        let info = parse_probe_output(&output)?;

        info!(
            "Audio stream of {}: {} channels, {} Hz, bit rate {:?}",
            video_path.display(),
            info.channels,
            info.sample_rate,
            info.bit_rate
        );
        Ok(info)
    }

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path, info: &AudioInfo) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        self.command_builder
            .extract_audio(video_path, audio_path, info)
            .execute()
            .await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        self.command_builder.version_check().execute().await?;
        info!("FFmpeg is available");
        Ok(())
    }
}
