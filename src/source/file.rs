use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::ImageSource;

/// Picks a single image file from disk
pub struct FileSource {
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

#[async_trait]
impl ImageSource for FileSource {
    /// Yields the file once, then `None`
    async fn pick(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.path.take() else {
            return Ok(None);
        };

        tracing::info!("Reading image from {}", path.display());

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read image at {}", path.display()))?;

        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picks_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, b"bytes").unwrap();

        let mut source = FileSource::new(&path);
        assert_eq!(source.pick().await.unwrap(), Some(b"bytes".to_vec()));
        assert_eq!(source.pick().await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("missing.png"));
        assert!(source.pick().await.is_err());
    }
}
