mod file;

pub use file::FileSink;

use anyhow::Result;
use image::RgbaImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write one named result image (e.g. "preview", "composite")
    fn write_image(&mut self, name: &str, image: &RgbaImage) -> Result<()>;
}
