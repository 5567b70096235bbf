//! Pixel-level transforms used by the comparison pipeline.

use crate::error::ImageError;
use image::{GrayImage, Luma, RgbImage};

// BT.601 luma weights (0.299, 0.587, 0.114) in 14-bit fixed point.
// They sum to exactly 1 << 14, so white stays 255.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Convert an RGB image to single-channel luma.
///
/// `Y = 0.299 R + 0.587 G + 0.114 B`, rounded to nearest. The input must be
/// in RGB channel order.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
        Luma([((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8])
    })
}

/// Blend two equally sized grayscale images 50/50.
///
/// Each output pixel is `round(0.5 a + 0.5 b)` with halves rounded up.
pub fn blend(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, ImageError> {
    if a.dimensions() != b.dimensions() {
        return Err(ImageError::InvalidDimensions {
            width: b.width(),
            height: b.height(),
        });
    }

    Ok(GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let sum = a.get_pixel(x, y)[0] as u16 + b.get_pixel(x, y)[0] as u16;
        Luma([((sum + 1) >> 1) as u8])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn grayscale_keeps_extremes() {
        let image = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let gray = to_grayscale(&image);

        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn grayscale_weights_green_heaviest() {
        let red = to_grayscale(&RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
        let green = to_grayscale(&RgbImage::from_pixel(1, 1, Rgb([0, 255, 0])));
        let blue = to_grayscale(&RgbImage::from_pixel(1, 1, Rgb([0, 0, 255])));

        assert_eq!(red.get_pixel(0, 0)[0], 76);
        assert_eq!(green.get_pixel(0, 0)[0], 150);
        assert_eq!(blue.get_pixel(0, 0)[0], 29);
    }

    #[test]
    fn grayscale_preserves_dimensions() {
        let gray = to_grayscale(&RgbImage::new(17, 5));
        assert_eq!(gray.dimensions(), (17, 5));
    }

    #[test]
    fn blend_averages_and_rounds_up() {
        let a = GrayImage::from_pixel(2, 2, Luma([10]));
        let b = GrayImage::from_pixel(2, 2, Luma([21]));

        let overlap = blend(&a, &b).unwrap();

        assert_eq!(overlap.get_pixel(0, 0)[0], 16);
    }

    #[test]
    fn blend_never_overflows() {
        let a = GrayImage::from_pixel(1, 1, Luma([255]));

        let overlap = blend(&a, &a).unwrap();

        assert_eq!(overlap.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn blend_rejects_mismatched_sizes() {
        let a = GrayImage::new(3, 3);
        let b = GrayImage::new(3, 4);

        assert!(blend(&a, &b).is_err());
    }
}
