use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{Result, SubgenError};

/// Object storage the pipeline publishes its artifacts to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file under the given blob name
    async fn upload(&self, source: &Path, blob_name: &str) -> Result<()>;

    /// Download a blob to a local file
    async fn download(&self, blob_name: &str, destination: &Path) -> Result<()>;

    /// Download a blob's contents as text
    async fn download_text(&self, blob_name: &str) -> Result<String>;

    /// Address of a blob as reported to users
    fn uri(&self, blob_name: &str) -> String;
}

/// Blob names of the pipeline's artifacts
pub struct BlobLayout;

impl BlobLayout {
    pub fn video(file_name: &str) -> String {
        format!("videos/{}", file_name)
    }

    pub fn audio(file_name: &str) -> String {
        format!("audios/{}", file_name)
    }

    pub fn transcript_text(source_language: &str) -> String {
        format!("texts/{}.txt", source_language)
    }

    pub fn subtitles(language: &str) -> String {
        format!("subtitles/{}.srt", language)
    }

    pub fn translated_text(source_language: &str, target_language: &str) -> String {
        format!(
            "translated_texts/{}/{}_{}_translations.txt",
            target_language, source_language, target_language
        )
    }
}

/// Object store backed by a local directory
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Local path of a blob; names escaping the root are rejected
    pub fn blob_path(&self, blob_name: &str) -> Result<PathBuf> {
        let relative = Path::new(blob_name);
        let is_plain = !blob_name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(SubgenError::Storage(format!("Invalid blob name '{}'", blob_name)));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, source: &Path, blob_name: &str) -> Result<()> {
        let destination = self.blob_path(blob_name)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(source, &destination).await.map_err(|e| {
            SubgenError::Storage(format!("Failed to upload {}: {}", source.display(), e))
        })?;

        info!("File {} uploaded to {}", source.display(), self.uri(blob_name));
        Ok(())
    }

    async fn download(&self, blob_name: &str, destination: &Path) -> Result<()> {
        let source = self.blob_path(blob_name)?;
        if !source.exists() {
            return Err(SubgenError::Storage(format!("Blob not found: {}", self.uri(blob_name))));
        }

        fs::copy(&source, destination).await?;

        info!("Downloaded {} to {}", self.uri(blob_name), destination.display());
        Ok(())
    }

    async fn download_text(&self, blob_name: &str) -> Result<String> {
        let source = self.blob_path(blob_name)?;
        if !source.exists() {
            return Err(SubgenError::Storage(format!("Blob not found: {}", self.uri(blob_name))));
        }

        Ok(fs::read_to_string(&source).await?)
    }

    fn uri(&self, blob_name: &str) -> String {
        format!("file://{}", self.root.join(blob_name).display())
    }
}
