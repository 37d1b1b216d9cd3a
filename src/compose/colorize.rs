use image::RgbaImage;

use super::Color;
use crate::mask::Mask;

/// Render a mask as a colored overlay for previewing.
///
/// Each pixel is `color` scaled by the coverage at that pixel, alpha included,
/// so the result uses the same straight coverage-as-alpha convention as a
/// background-less composite.
///
/// Returns `None` for a mask with no pixels.
pub fn colorize(mask: &Mask, color: Color) -> Option<RgbaImage> {
    if mask.is_empty() {
        tracing::debug!("Refusing to colorize an empty mask");
        return None;
    }

    let _span = tracing::debug_span!("colorize").entered();

    let scale = |channel: u8, coverage: f32| (channel as f32 * coverage).round().clamp(0.0, 255.0) as u8;

    Some(RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let coverage = mask.coverage(x, y);
        image::Rgba([
            scale(color.r, coverage),
            scale(color.g, coverage),
            scale(color.b, coverage),
            scale(color.a, coverage),
        ])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_color_by_coverage() {
        let mask = Mask::new(3, 1, vec![0.0, 0.5, 1.0]).unwrap();
        let preview = colorize(&mask, Color::rgb(200, 100, 0)).unwrap();

        assert_eq!(preview.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(preview.get_pixel(1, 0).0, [100, 50, 0, 128]);
        assert_eq!(preview.get_pixel(2, 0).0, [200, 100, 0, 255]);
    }

    #[test]
    fn empty_mask_has_no_output() {
        assert!(colorize(&Mask::filled(0, 4, 1.0), Color::RED).is_none());
        assert!(colorize(&Mask::filled(4, 0, 1.0), Color::RED).is_none());
    }

    #[test]
    fn out_of_range_coverage_matches_clamped() {
        let over = Mask::new(2, 1, vec![1.3, -0.2]).unwrap();
        let clamped = Mask::new(2, 1, vec![1.0, 0.0]).unwrap();
        assert_eq!(colorize(&over, Color::TEAL), colorize(&clamped, Color::TEAL));
    }
}
