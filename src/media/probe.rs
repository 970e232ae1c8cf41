use serde::Deserialize;

use crate::error::{Result, SubgenError};

/// Audio stream parameters carried over into the extracted audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub channels: u32,
    pub sample_rate: u32,
    /// Bits per second; not every container reports it
    pub bit_rate: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

// ffprobe prints numeric rates as strings
#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    bit_rate: Option<String>,
}

/// Read the first audio stream's parameters from `ffprobe -of json` output
pub fn parse_probe_output(json: &str) -> Result<AudioInfo> {
    let output: ProbeOutput = serde_json::from_str(json)?;

    let stream = output
        .streams
        .into_iter()
        .find(|stream| stream.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| SubgenError::Media("No audio stream found".to_string()))?;

    let channels = stream
        .channels
        .filter(|&channels| channels > 0)
        .ok_or_else(|| SubgenError::Media("Audio stream has no channel count".to_string()))?;

    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|rate| rate.parse::<u32>().ok())
        .filter(|&rate| rate > 0)
        .ok_or_else(|| SubgenError::Media("Audio stream has no sample rate".to_string()))?;

    let bit_rate = stream.bit_rate.as_deref().and_then(|rate| rate.parse::<u64>().ok());

    Ok(AudioInfo {
        channels,
        sample_rate,
        bit_rate,
    })
}
