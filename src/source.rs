use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Result, SubgenError};

/// Where the input video comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Url(String),
    File(PathBuf),
}

impl VideoSource {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::File(PathBuf::from(input))
        }
    }

    /// File name the video is stored under, falling back to `default`
    pub fn file_name(&self, default: &str) -> String {
        let name = match self {
            Self::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .map(str::to_string),
            Self::File(path) => path.file_name().map(|name| name.to_string_lossy().into_owned()),
        };

        name.filter(|name| !name.is_empty() && name.contains('.'))
            .unwrap_or_else(|| default.to_string())
    }

    /// Place the video at `destination`, downloading or copying as needed
    pub async fn fetch(&self, destination: &Path) -> Result<()> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    return Err(SubgenError::FileNotFound(path.display().to_string()));
                }
                info!("Copying video {} to {}", path.display(), destination.display());
                fs::copy(path, destination).await?;
                Ok(())
            }
            Self::Url(url) => download(url, destination).await,
        }
    }
}

async fn download(url: &str, destination: &Path) -> Result<()> {
    info!("Downloading video from {}", url);

    let client = Client::new();
    let mut response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(SubgenError::Download(format!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        )));
    }

    let pb = ProgressBar::new(response.content_length().unwrap_or(0));
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .map_err(|e| SubgenError::Download(format!("Invalid progress template: {}", e)))?
        .progress_chars("#>-"));

    // Write to a temporary file and move it into place once complete
    let temp_path = destination.with_extension("part");
    let mut file = fs::File::create(&temp_path).await?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }

    file.flush().await?;
    drop(file);

    fs::rename(&temp_path, destination).await?;

    pb.finish_and_clear();
    info!("Downloaded {} to {}", url, destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            VideoSource::parse("https://example.com/talk.mp4"),
            VideoSource::Url("https://example.com/talk.mp4".to_string())
        );
        assert_eq!(
            VideoSource::parse("videos/talk.mp4"),
            VideoSource::File(PathBuf::from("videos/talk.mp4"))
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(VideoSource::parse("https://example.com/a/talk.mp4?sig=1").file_name("video.mp4"), "talk.mp4");
        assert_eq!(VideoSource::parse("https://example.com/watch").file_name("video.mp4"), "video.mp4");
        assert_eq!(VideoSource::parse("/data/clip.mkv").file_name("video.mp4"), "clip.mkv");
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"not really a video").unwrap();
        let destination = dir.path().join("video.mp4");

        VideoSource::File(source).fetch(&destination).await.unwrap();

        assert_eq!(std::fs::read(destination).unwrap(), b"not really a video");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let result = VideoSource::parse("/nonexistent/clip.mp4").fetch(&dir.path().join("v.mp4")).await;

        assert!(matches!(result, Err(SubgenError::FileNotFound(_))));
    }
}
