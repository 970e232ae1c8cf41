use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubgenError};
use super::AudioInfo;

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio bit rate
    pub fn audio_bit_rate(self, bit_rate: u64) -> Self {
        self.arg("-b:a").arg(bit_rate.to_string())
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Execute the command, discarding its output
    pub async fn execute(&self) -> Result<()> {
        self.execute_capture().await.map(|_| ())
    }

    /// Execute the command and return its stdout
    pub async fn execute_capture(&self) -> Result<String> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SubgenError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubgenError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for common media processing operations
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build audio extraction command keeping the source's audio parameters
    pub fn extract_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        info: &AudioInfo,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Audio extraction").input(video_path);

        if let Some(bit_rate) = info.bit_rate {
            cmd = cmd.audio_bit_rate(bit_rate);
        }

        cmd.audio_channels(info.channels)
            .audio_sample_rate(info.sample_rate)
            .no_video()
            .output(audio_path)
            .overwrite()
    }

    /// Build stream probe command printing JSON
    pub fn probe_streams<P: AsRef<Path>>(&self, video_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Stream probe")
            .args(["-v", "error", "-show_streams", "-of", "json"])
            .output(video_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("ffmpeg", "ffprobe")
    }

    #[test]
    fn test_extract_audio_arguments() {
        let info = AudioInfo {
            channels: 2,
            sample_rate: 44_100,
            bit_rate: Some(128_000),
        };
        let cmd = builder().extract_audio("video.mp4", "audio.wav", &info);

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec!["-i", "video.mp4", "-b:a", "128000", "-ac", "2", "-ar", "44100", "-vn", "audio.wav", "-y"]
        );
    }

    #[test]
    fn test_extract_audio_without_bit_rate() {
        let info = AudioInfo {
            channels: 1,
            sample_rate: 16_000,
            bit_rate: None,
        };
        let cmd = builder().extract_audio("video.mp4", "audio.wav", &info);

        assert!(!cmd.args.contains(&"-b:a".to_string()));
    }

    #[test]
    fn test_probe_streams_uses_probe_binary() {
        let cmd = builder().probe_streams("video.mp4");

        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(cmd.args.last().map(String::as_str), Some("video.mp4"));
    }

    #[tokio::test]
    async fn test_execute_reports_missing_binary() {
        let cmd = MediaCommand::new("/nonexistent/ffmpeg", "Version check").arg("-version");
        assert!(matches!(cmd.execute().await, Err(SubgenError::Media(_))));
    }
}
