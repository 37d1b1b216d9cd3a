mod file;

pub use file::FileSource;

use anyhow::Result;
use async_trait::async_trait;
use image::RgbaImage;

use crate::error::DecodeError;

/// Trait for image pickers
#[async_trait]
pub trait ImageSource: Send {
    /// Wait for the user to pick an image
    ///
    /// Returns the raw encoded bytes, or `None` when nothing was picked.
    async fn pick(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Decode picked bytes into an RGBA image
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let _span = tracing::debug_span!("decode").entered();

    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty { width, height });
    }

    tracing::debug!("Decoded {}x{} image from {} bytes", width, height, bytes.len());
    Ok(image)
}
