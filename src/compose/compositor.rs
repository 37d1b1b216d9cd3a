use std::borrow::Cow;

use image::RgbaImage;

use super::geometry;
use crate::error::CompositeError;
use crate::mask::Mask;

/// Inputs of one composite operation. The mask must already be aligned to
/// the source image; the background may have any size.
#[derive(Debug, Clone, Copy)]
pub struct CompositeRequest<'a> {
    pub source: &'a RgbaImage,
    pub mask: &'a Mask,
    pub background: Option<&'a RgbaImage>,
}

impl<'a> CompositeRequest<'a> {
    pub fn new(source: &'a RgbaImage, mask: &'a Mask) -> Self {
        Self {
            source,
            mask,
            background: None,
        }
    }

    pub fn with_background(mut self, background: &'a RgbaImage) -> Self {
        self.background = Some(background);
        self
    }
}

fn blend(foreground: u8, background: u8, coverage: f32) -> u8 {
    (foreground as f32 * coverage + background as f32 * (1.0 - coverage))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Blend the source over the background through the mask.
///
/// With a background every channel is `source * c + background * (1 - c)`.
/// Without one the source color is kept and its alpha is multiplied by the
/// coverage, leaving the subject on a transparent canvas.
pub fn composite(request: &CompositeRequest<'_>) -> Result<RgbaImage, CompositeError> {
    let source = request.source;
    let mask = request.mask;
    let (width, height) = source.dimensions();

    if mask.dimensions() != (width, height) {
        return Err(CompositeError::DimensionMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            source_width: width,
            source_height: height,
        });
    }

    let _span = tracing::debug_span!("composite").entered();

    let background: Option<Cow<'_, RgbaImage>> = match request.background {
        Some(bg) if bg.width() == 0 || bg.height() == 0 => {
            tracing::debug!("Background has no pixels, cannot cover the source");
            return Err(CompositeError::InvalidExtent);
        }
        Some(bg) if bg.dimensions() != (width, height) => {
            Some(Cow::Owned(geometry::scale_and_crop(bg, width, height)))
        }
        Some(bg) => Some(Cow::Borrowed(bg)),
        None => None,
    };

    let mut raw = Vec::with_capacity(width as usize * height as usize * 4);
    for (x, y, pixel) in source.enumerate_pixels() {
        let coverage = mask.coverage(x, y).clamp(0.0, 1.0);
        match &background {
            Some(bg) => {
                let behind = bg.get_pixel(x, y);
                for channel in 0..4 {
                    raw.push(blend(pixel[channel], behind[channel], coverage));
                }
            }
            None => {
                raw.extend_from_slice(&pixel.0[..3]);
                raw.push(blend(pixel[3], 0, coverage));
            }
        }
    }

    let output = RgbaImage::from_raw(width, height, raw).ok_or(CompositeError::RenderFailed)?;
    if output.width() == 0 || output.height() == 0 {
        return Err(CompositeError::InvalidExtent);
    }

    tracing::debug!(
        "Composited {}x{} (background: {})",
        width,
        height,
        background.is_some()
    );
    Ok(output)
}

/// Cut a single subject out of the source: transparent outside the mask and
/// cropped to the mask's bounds.
pub fn extract_subject(source: &RgbaImage, mask: &Mask) -> Result<RgbaImage, CompositeError> {
    let cutout = composite(&CompositeRequest::new(source, mask))?;
    let bounds = mask.bounds().ok_or(CompositeError::InvalidExtent)?;
    Ok(geometry::crop_to(&cutout, bounds))
}
