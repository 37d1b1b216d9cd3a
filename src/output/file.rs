use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;

use super::OutputSink;

/// Writes each result as `<dir>/<name>.png`
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing results to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    /// Paths written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl OutputSink for FileSink {
    fn write_image(&mut self, name: &str, image: &RgbaImage) -> Result<()> {
        let path = self.dir.join(format!("{name}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(
            "Wrote {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        self.written.push(path);
        Ok(())
    }
}
