use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

use super::instances::InstanceSplitter;
use super::types::{Instance, MaskProvider};
use crate::error::ProviderError;
use crate::mask::Mask;

/// Provider backed by a precomputed foreground matte image.
///
/// The matte is read as 8-bit grayscale (white = foreground), resampled to
/// the analyzed image and split into one instance per connected region.
pub struct MatteFileProvider {
    matte: Mask,
    splitter: InstanceSplitter,
}

impl MatteFileProvider {
    pub fn open<P: AsRef<Path>>(path: P, splitter: InstanceSplitter) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading matte from {}", path.display());

        let matte = image::open(path)
            .with_context(|| format!("Failed to open matte {}", path.display()))?
            .to_luma8();

        tracing::info!("Matte loaded: {}x{}", matte.width(), matte.height());

        Ok(Self::new(Mask::from_luma(&matte), splitter))
    }

    pub fn new(matte: Mask, splitter: InstanceSplitter) -> Self {
        Self { matte, splitter }
    }
}

impl MaskProvider for MatteFileProvider {
    fn analyze(&self, image: &RgbaImage) -> Result<Vec<Instance>, ProviderError> {
        let _span = tracing::debug_span!("matte_file_analyze").entered();

        if self.matte.is_empty() {
            return Err(ProviderError::InvalidInput("matte has no pixels".to_string()));
        }

        let (width, height) = image.dimensions();
        let matte = self.matte.resample_to(width, height);
        Ok(self.splitter.split(&matte))
    }

    fn name(&self) -> &str {
        "matte-file"
    }
}
