use image::{GrayImage, ImageBuffer, Luma};

use crate::compose::geometry;
use crate::error::MaskError;

/// Single-channel coverage grid: 0.0 = background, 1.0 = foreground.
///
/// Samples are clamped into `[0.0, 1.0]` when the mask is built, so nothing
/// outside that range ever reaches blending math. Flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn clamp_coverage(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Mask {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, MaskError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(MaskError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data: data.into_iter().map(clamp_coverage).collect(),
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> f32,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(clamp_coverage(f(x, y)));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn filled(width: u32, height: u32, coverage: f32) -> Self {
        Self::from_fn(width, height, |_, _| coverage)
    }

    /// Build a mask from an 8-bit grayscale matte (255 = foreground)
    pub fn from_luma(matte: &GrayImage) -> Self {
        Self::from_fn(matte.width(), matte.height(), |x, y| {
            matte.get_pixel(x, y)[0] as f32 / 255.0
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at a pixel; 0.0 outside the grid
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[(y * self.width + x) as usize]
    }

    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Number of pixels with any coverage
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&c| c > 0.0).count()
    }

    /// Smallest rectangle holding every pixel with coverage above zero
    pub fn bounds(&self) -> Option<Bounds> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for y in 0..self.height {
            for x in 0..self.width {
                if self.coverage(x, y) > 0.0 {
                    found = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        found.then(|| Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Scale independently in X and Y, then crop at the origin to exactly
    /// `width x height`.
    pub fn resample_to(&self, width: u32, height: u32) -> Mask {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        if self.is_empty() {
            return Mask::filled(width, height, 0.0);
        }

        let _span = tracing::debug_span!("resample_mask").entered();
        tracing::debug!(
            "Resampling mask {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );

        let grid: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(self.width, self.height, |x, y| Luma([self.coverage(x, y)]));
        let fitted = geometry::scale_and_crop(&grid, width, height);

        Mask::from_fn(width, height, |x, y| fitted.get_pixel(x, y)[0])
    }

    /// Per-pixel maximum of several masks, sized after the first one
    pub fn union<'a, I>(masks: I) -> Option<Mask>
    where
        I: IntoIterator<Item = &'a Mask>,
    {
        let mut masks = masks.into_iter();
        let mut combined = masks.next()?.clone();
        for mask in masks {
            for y in 0..combined.height {
                for x in 0..combined.width {
                    let idx = (y * combined.width + x) as usize;
                    combined.data[idx] = combined.data[idx].max(mask.coverage(x, y));
                }
            }
        }
        Some(combined)
    }
}
