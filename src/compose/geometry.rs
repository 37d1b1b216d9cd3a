use image::{imageops, ImageBuffer, Pixel};

use crate::mask::Bounds;

/// Smallest size reached by scaling `source` independently in X and Y so it
/// covers `target`. Never smaller than `target` on either axis.
pub fn cover_size(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (tw, th) = target;
    if sw == 0 || sh == 0 {
        return target;
    }

    let scale_x = tw as f64 / sw as f64;
    let scale_y = th as f64 / sh as f64;
    let width = (sw as f64 * scale_x).ceil() as u32;
    let height = (sh as f64 * scale_y).ceil() as u32;

    (width.max(tw), height.max(th))
}

/// Scale an image to cover `width x height`, then crop it at the origin to
/// exactly that extent. Aspect ratio is not preserved.
pub fn scale_and_crop<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    if image.dimensions() == (width, height) {
        return image.clone();
    }

    let (scaled_width, scaled_height) = cover_size(image.dimensions(), (width, height));
    tracing::debug!(
        "Scaling {}x{} -> {}x{}, cropping to {}x{}",
        image.width(),
        image.height(),
        scaled_width,
        scaled_height,
        width,
        height
    );

    let scaled = imageops::resize(
        image,
        scaled_width,
        scaled_height,
        imageops::FilterType::Triangle,
    );
    if scaled.dimensions() == (width, height) {
        return scaled;
    }

    imageops::crop_imm(&scaled, 0, 0, width, height).to_image()
}

/// Copy the region `bounds` out of an image
pub fn crop_to<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    bounds: Bounds,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
}
