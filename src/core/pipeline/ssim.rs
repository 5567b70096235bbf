//! Structural Similarity Index (SSIM) for grayscale images.
//!
//! Mean SSIM over a sliding square window with uniform weights:
//!
//! ```text
//! SSIM = ((2 ux uy + C1)(2 vxy + C2)) / ((ux² + uy² + C1)(vx + vy + C2))
//! C1 = (0.01 L)², C2 = (0.03 L)², L = 255
//! ```
//!
//! Variances use the sample normalisation `N / (N - 1)` with `N = win²`.
//! Only windows that lie fully inside the image contribute to the mean,
//! so a border of `win / 2` pixels is skipped.
//!
//! Window sums come from summed-area tables of exact integers. Rows are
//! scored in parallel and reduced in row order, and the formula is
//! symmetric in its arguments, so `ssim(a, b) == ssim(b, a)` bit for bit.

use crate::error::ImageError;
use image::GrayImage;
use rayon::prelude::*;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Summed-area tables for the five window statistics
struct WindowSums {
    stride: usize,
    x: Vec<u64>,
    y: Vec<u64>,
    xx: Vec<u64>,
    yy: Vec<u64>,
    xy: Vec<u64>,
}

impl WindowSums {
    fn build(a: &GrayImage, b: &GrayImage) -> Self {
        let (width, height) = (a.width() as usize, a.height() as usize);
        let stride = width + 1;
        let len = stride * (height + 1);
        let mut sums = Self {
            stride,
            x: vec![0; len],
            y: vec![0; len],
            xx: vec![0; len],
            yy: vec![0; len],
            xy: vec![0; len],
        };

        let (pa, pb) = (a.as_raw(), b.as_raw());
        for row in 0..height {
            let (mut rx, mut ry, mut rxx, mut ryy, mut rxy) = (0u64, 0u64, 0u64, 0u64, 0u64);
            for col in 0..width {
                let va = pa[row * width + col] as u64;
                let vb = pb[row * width + col] as u64;
                rx += va;
                ry += vb;
                rxx += va * va;
                ryy += vb * vb;
                rxy += va * vb;

                let above = row * stride + col + 1;
                let here = (row + 1) * stride + col + 1;
                sums.x[here] = sums.x[above] + rx;
                sums.y[here] = sums.y[above] + ry;
                sums.xx[here] = sums.xx[above] + rxx;
                sums.yy[here] = sums.yy[above] + ryy;
                sums.xy[here] = sums.xy[above] + rxy;
            }
        }

        sums
    }

    /// Sum of `table` over the `win` x `win` window whose top-left is (left, top)
    fn window(&self, table: &[u64], left: usize, top: usize, win: usize) -> u64 {
        let (right, bottom) = (left + win, top + win);
        table[bottom * self.stride + right] + table[top * self.stride + left]
            - table[top * self.stride + right]
            - table[bottom * self.stride + left]
    }
}

/// Mean SSIM of two equally sized grayscale images, in [-1, 1].
///
/// `win` must be odd and at least 3, and both images must be at least
/// `win` pixels in each dimension.
pub fn mean_ssim(a: &GrayImage, b: &GrayImage, win: u32) -> Result<f64, ImageError> {
    if a.dimensions() != b.dimensions() {
        return Err(ImageError::InvalidDimensions {
            width: b.width(),
            height: b.height(),
        });
    }
    let (width, height) = a.dimensions();
    if win < 3 || win % 2 == 0 || width < win || height < win {
        return Err(ImageError::InvalidDimensions { width, height });
    }

    let win = win as usize;
    let sums = WindowSums::build(a, b);

    let np = (win * win) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let rows = height as usize - win + 1;
    let cols = width as usize - win + 1;

    let row_totals: Vec<f64> = (0..rows)
        .into_par_iter()
        .map(|top| {
            (0..cols)
                .map(|left| {
                    let ux = sums.window(&sums.x, left, top, win) as f64 / np;
                    let uy = sums.window(&sums.y, left, top, win) as f64 / np;
                    let uxx = sums.window(&sums.xx, left, top, win) as f64 / np;
                    let uyy = sums.window(&sums.yy, left, top, win) as f64 / np;
                    let uxy = sums.window(&sums.xy, left, top, win) as f64 / np;

                    let vx = cov_norm * (uxx - ux * ux);
                    let vy = cov_norm * (uyy - uy * uy);
                    let vxy = cov_norm * (uxy - ux * uy);

                    let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
                    let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
                    numerator / denominator
                })
                .sum::<f64>()
        })
        .collect();

    let total: f64 = row_totals.iter().sum();
    Ok(total / (rows * cols) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn pattern(width: u32, height: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(31) ^ y.wrapping_mul(17)).wrapping_add(seed * 97);
            Luma([(v % 256) as u8])
        })
    }

    #[test]
    fn identical_images_score_exactly_one() {
        let image = pattern(40, 30, 1);
        assert_eq!(mean_ssim(&image, &image, 7).unwrap(), 1.0);
    }

    #[test]
    fn constant_identical_images_score_one() {
        let image = GrayImage::from_pixel(20, 20, Luma([255]));
        assert_eq!(mean_ssim(&image, &image, 7).unwrap(), 1.0);
    }

    #[test]
    fn ssim_is_symmetric() {
        let a = pattern(40, 30, 1);
        let b = pattern(40, 30, 5);
        assert_eq!(
            mean_ssim(&a, &b, 7).unwrap(),
            mean_ssim(&b, &a, 7).unwrap()
        );
    }

    #[test]
    fn inverted_image_scores_negative() {
        let a = pattern(40, 40, 3);
        let inverted = GrayImage::from_fn(40, 40, |x, y| Luma([255 - a.get_pixel(x, y)[0]]));

        assert!(mean_ssim(&a, &inverted, 7).unwrap() < 0.0);
    }

    #[test]
    fn black_and_white_are_dissimilar() {
        let black = GrayImage::from_pixel(20, 20, Luma([0]));
        let white = GrayImage::from_pixel(20, 20, Luma([255]));

        let score = mean_ssim(&black, &white, 7).unwrap();

        assert!(score < 0.01, "score was {}", score);
    }

    #[test]
    fn small_brightness_shift_stays_similar() {
        let a = pattern(30, 30, 2);
        let b = GrayImage::from_fn(30, 30, |x, y| Luma([a.get_pixel(x, y)[0].saturating_add(2)]));

        assert!(mean_ssim(&a, &b, 7).unwrap() > 0.9);
    }

    #[test]
    fn window_larger_than_image_is_rejected() {
        let image = GrayImage::new(5, 5);
        assert!(mean_ssim(&image, &image, 7).is_err());
    }

    #[test]
    fn even_window_is_rejected() {
        let image = GrayImage::new(20, 20);
        assert!(mean_ssim(&image, &image, 8).is_err());
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = GrayImage::new(20, 20);
        let b = GrayImage::new(20, 21);
        assert!(mean_ssim(&a, &b, 7).is_err());
    }
}
