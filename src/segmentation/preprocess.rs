use anyhow::Result;
use image::{imageops, RgbaImage};
use ndarray::Array4;

use crate::mask::Mask;

/// Preprocessor for converting RGBA images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl Preprocessor {
    /// ImageNet normalization, as expected by U2-Net style salient object models
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }

    pub fn with_normalization(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.mean = mean;
        self.std = std;
        self
    }

    /// Preprocess an image into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions (alpha is dropped)
    /// 2. Scale to [0, 1], then apply per-channel mean/std
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbaImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for channel in 0..3 {
                let value = pixel[channel] as f32 / 255.0;
                tensor[[0, channel, y as usize, x as usize]] =
                    (value - self.mean[channel]) / self.std[channel];
            }
        }

        Ok(tensor)
    }

    /// Turn a raw model matte into a mask at the source image's resolution
    ///
    /// Values are min-max normalized first, since salient object models emit
    /// unnormalized saliency rather than calibrated coverage.
    pub fn postprocess_matte(
        matte: &[f32],
        matte_width: u32,
        matte_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Mask> {
        let _span = tracing::debug_span!("postprocess").entered();

        let (min, max) = matte
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;
        let normalized: Vec<f32> = if range > f32::EPSILON {
            matte.iter().map(|v| (v - min) / range).collect()
        } else {
            matte.to_vec()
        };

        let mask = Mask::new(matte_width, matte_height, normalized)?;
        Ok(mask.resample_to(target_width, target_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn tensor_is_nchw_and_normalized() {
        let image = RgbaImage::from_pixel(8, 4, Rgba([255, 0, 255, 10]));
        let pre = Preprocessor::new(8, 4).with_normalization([0.5; 3], [0.5; 3]);
        let tensor = pre.preprocess(&image).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 4, 8]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 3, 7]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn matte_is_stretched_and_resized() {
        let matte = vec![0.2, 0.6, 0.6, 0.2];
        let mask = Preprocessor::postprocess_matte(&matte, 2, 2, 2, 2).unwrap();
        assert_eq!(mask.samples(), &[0.0, 1.0, 1.0, 0.0]);

        let resized = Preprocessor::postprocess_matte(&matte, 2, 2, 6, 6).unwrap();
        assert_eq!(resized.dimensions(), (6, 6));
    }
}
