//! # Pipeline Module
//!
//! Compares two signature images and keeps every intermediate stage.
//!
//! ## Stages
//! 1. Convert both images to grayscale (BT.601 luma)
//! 2. Resize both to the canonical 300x300, ignoring aspect ratio
//! 3. Score with mean SSIM, scaled to a percentage and rounded to 2 decimals
//! 4. Classify: a score strictly above 80 is a match
//! 5. Blend the two resized images 50/50 for display (no effect on the score)
//!
//! ## Example
//! ```rust,ignore
//! use signature_matcher::core::pipeline::SimilarityPipeline;
//!
//! let pipeline = SimilarityPipeline::default();
//! let result = pipeline.compare(&reference, &candidate)?;
//! println!("{}% similar", result.score);
//! ```

mod resize;
mod ssim;
mod transform;

pub use resize::FastResizer;
pub use ssim::mean_ssim;
pub use transform::{blend, to_grayscale};

use crate::error::{Result, SignatureMatchError};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelineStage};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Side length of the canonical comparison size
pub const CANONICAL_SIZE: u32 = 300;

/// Scores strictly above this are a match
pub const MATCH_THRESHOLD: f64 = 80.0;

/// Default SSIM window side length
pub const DEFAULT_WINDOW: u32 = 7;

/// Match decision for a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Match,
    NoMatch,
}

impl Classification {
    /// Classify a percentage score against [`MATCH_THRESHOLD`]
    pub fn from_score(score: f64) -> Self {
        if score > MATCH_THRESHOLD {
            Classification::Match
        } else {
            Classification::NoMatch
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Classification::Match)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Match => write!(f, "Match"),
            Classification::NoMatch => write!(f, "No Match"),
        }
    }
}

/// Everything produced by one comparison
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// SSIM x 100, rounded to 2 decimals. May be negative.
    pub score: f64,
    pub classification: Classification,
    pub grayscale_a: GrayImage,
    pub grayscale_b: GrayImage,
    pub resized_a: GrayImage,
    pub resized_b: GrayImage,
    /// 50/50 blend of the resized images
    pub overlap: GrayImage,
}

/// Pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Width both images are resized to
    pub width: u32,
    /// Height both images are resized to
    pub height: u32,
    /// SSIM window side length (odd, >= 3)
    pub window: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: CANONICAL_SIZE,
            height: CANONICAL_SIZE,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Builder for pipeline configuration
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canonical comparison size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set the SSIM window side length
    pub fn window(mut self, window: u32) -> Self {
        self.config.window = window;
        self
    }

    /// Validate and build the pipeline
    pub fn build(self) -> Result<SimilarityPipeline> {
        let PipelineConfig {
            width,
            height,
            window,
        } = self.config;

        if window < 3 || window % 2 == 0 {
            return Err(SignatureMatchError::Config(format!(
                "SSIM window must be odd and at least 3, got {}",
                window
            )));
        }
        if width < window || height < window {
            return Err(SignatureMatchError::Config(format!(
                "canonical size {}x{} is smaller than the {}px SSIM window",
                width, height, window
            )));
        }

        Ok(SimilarityPipeline {
            config: self.config,
        })
    }
}

/// Stateless comparison pipeline
#[derive(Debug, Clone, Default)]
pub struct SimilarityPipeline {
    config: PipelineConfig,
}

impl SimilarityPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compare two RGB images
    pub fn compare(&self, a: &RgbImage, b: &RgbImage) -> Result<ComparisonResult> {
        self.compare_with_events(a, b, &null_sender())
    }

    /// Compare two RGB images, reporting each finished stage
    pub fn compare_with_events(
        &self,
        a: &RgbImage,
        b: &RgbImage,
        events: &EventSender,
    ) -> Result<ComparisonResult> {
        let (grayscale_a, grayscale_b) = rayon::join(|| to_grayscale(a), || to_grayscale(b));
        stage_done(events, PipelineStage::Grayscale);

        let mut resizer = FastResizer::new();
        let resized_a = resizer.resize_exact(&grayscale_a, self.config.width, self.config.height)?;
        let resized_b = resizer.resize_exact(&grayscale_b, self.config.width, self.config.height)?;
        stage_done(events, PipelineStage::Resize);

        let ssim = mean_ssim(&resized_a, &resized_b, self.config.window)?;
        let score = round_score(ssim * 100.0);
        let classification = Classification::from_score(score);
        stage_done(events, PipelineStage::Similarity);
        debug!(ssim, score, %classification, "scored signatures");

        let overlap = blend(&resized_a, &resized_b)?;
        stage_done(events, PipelineStage::Overlap);

        Ok(ComparisonResult {
            score,
            classification,
            grayscale_a,
            grayscale_b,
            resized_a,
            resized_b,
            overlap,
        })
    }
}

/// Compare two images with the default configuration
pub fn compare(a: &RgbImage, b: &RgbImage) -> Result<ComparisonResult> {
    SimilarityPipeline::default().compare(a, b)
}

/// Round to 2 decimal places.
///
/// Rounds the exact binary value, so `1.115` (stored just below the tie)
/// becomes `1.11`. Exact ties go to the even hundredth.
fn round_score(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    if exponent >= 0 {
        return value;
    }

    // |value| * 100 == scaled * 2^-shift, exactly
    let scaled = mantissa as u128 * 100;
    let shift = exponent.unsigned_abs();
    let hundredths = if shift > 64 {
        0
    } else {
        let quotient = scaled >> shift;
        let remainder = scaled - (quotient << shift);
        let half = 1u128 << (shift - 1);
        if remainder > half || (remainder == half && quotient & 1 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    let rounded = hundredths as f64 / 100.0;
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

fn stage_done(events: &EventSender, stage: PipelineStage) {
    events.send(Event::Pipeline(PipelineEvent::StageCompleted { stage }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::{stage_views, ComparisonReport, SimilarityTier};
    use crate::events::EventChannel;
    use image::Rgb;

    fn signature_like(width: u32, height: u32, phase: f32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let curve = (height as f32 / 2.0)
                + (x as f32 / 9.0 + phase).sin() * (height as f32 / 4.0);
            if (y as f32 - curve).abs() < 3.0 {
                Rgb([20, 20, 40])
            } else {
                Rgb([245, 245, 240])
            }
        })
    }

    fn noise(width: u32, height: u32, mut state: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let v = (state >> 24) as u8;
            Rgb([v, v, v])
        })
    }

    #[test]
    fn self_comparison_is_exactly_100() {
        let image = signature_like(180, 60, 0.0);

        let result = compare(&image, &image).unwrap();

        assert_eq!(result.score, 100.0);
        assert_eq!(result.classification, Classification::Match);
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = signature_like(180, 60, 0.0);
        let b = signature_like(150, 70, 1.3);

        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();

        assert_eq!(ab.score, ba.score);
    }

    #[test]
    fn comparison_is_idempotent() {
        let a = signature_like(180, 60, 0.0);
        let b = noise(90, 40, 7);
        let pipeline = SimilarityPipeline::default();

        let first = pipeline.compare(&a, &b).unwrap();
        let second = pipeline.compare(&a, &b).unwrap();

        assert_eq!(first.score, second.score);
        assert_eq!(first.overlap, second.overlap);
    }

    #[test]
    fn noise_does_not_match_signature() {
        let a = signature_like(180, 60, 0.0);
        let b = noise(180, 60, 12345);

        let result = compare(&a, &b).unwrap();

        assert!(result.score < 50.0, "score was {}", result.score);
        assert_eq!(result.classification, Classification::NoMatch);
    }

    #[test]
    fn inverted_image_scores_negative_through_report() {
        let a = noise(180, 60, 99);
        let inverted = RgbImage::from_fn(180, 60, |x, y| {
            let Rgb([r, g, b]) = *a.get_pixel(x, y);
            Rgb([255 - r, 255 - g, 255 - b])
        });

        let result = compare(&a, &inverted).unwrap();

        assert!(result.score < 0.0, "score was {}", result.score);
        assert_eq!(result.classification, Classification::NoMatch);

        let report = ComparisonReport::new("alice", &result, &stage_views(&a, &inverted, &result));
        assert_eq!(report.score, result.score);
        assert_eq!(report.tier, SimilarityTier::Poor);
        assert!(report.message.starts_with("Failure"));
        assert!(report.message.contains('-'), "message was {}", report.message);
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        let a = signature_like(180, 60, 0.0);
        let b = signature_like(180, 60, 0.4);

        let score = compare(&a, &b).unwrap().score;

        assert!(((score * 100.0).round() - score * 100.0).abs() < 1e-6);
    }

    #[test]
    fn rounding_uses_exact_binary_value() {
        assert_eq!(round_score(1.115), 1.11);
        assert_eq!(round_score(2.675), 2.67);
        assert_eq!(round_score(1.005), 1.0);
        assert_eq!(round_score(12.3456), 12.35);
        assert_eq!(round_score(99.999), 100.0);
        assert_eq!(round_score(80.0), 80.0);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round_score(0.125), 0.12);
        assert_eq!(round_score(0.375), 0.38);
        assert_eq!(round_score(0.625), 0.62);
        assert_eq!(round_score(-0.125), -0.12);
        assert_eq!(round_score(-0.375), -0.38);
    }

    #[test]
    fn negative_scores_keep_their_sign() {
        assert_eq!(round_score(-12.3456), -12.35);
        assert_eq!(round_score(-1.115), -1.11);
        assert_eq!(round_score(1e-300), 0.0);
    }

    #[test]
    fn intermediate_images_have_expected_sizes() {
        let a = signature_like(180, 60, 0.0);
        let b = signature_like(90, 120, 0.0);

        let result = compare(&a, &b).unwrap();

        assert_eq!(result.grayscale_a.dimensions(), (180, 60));
        assert_eq!(result.grayscale_b.dimensions(), (90, 120));
        assert_eq!(result.resized_a.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
        assert_eq!(result.resized_b.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
        assert_eq!(result.overlap.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
    }

    #[test]
    fn classification_boundary_is_strict() {
        assert_eq!(Classification::from_score(80.0), Classification::NoMatch);
        assert_eq!(Classification::from_score(80.01), Classification::Match);
        assert_eq!(Classification::from_score(-12.5), Classification::NoMatch);
    }

    #[test]
    fn empty_image_is_invalid() {
        let empty = RgbImage::new(0, 0);
        let other = signature_like(50, 50, 0.0);

        let error = compare(&empty, &other).unwrap_err();

        assert!(error.is_invalid_image());
    }

    #[test]
    fn builder_rejects_even_window() {
        let result = SimilarityPipeline::builder().window(6).build();
        assert!(matches!(result, Err(SignatureMatchError::Config(_))));
    }

    #[test]
    fn builder_rejects_size_below_window() {
        let result = SimilarityPipeline::builder().size(5, 300).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_applies_custom_size() {
        let pipeline = SimilarityPipeline::builder().size(64, 32).build().unwrap();
        let image = signature_like(100, 50, 0.0);

        let result = pipeline.compare(&image, &image).unwrap();

        assert_eq!(result.overlap.dimensions(), (64, 32));
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn stages_are_reported_in_order() {
        let (sender, receiver) = EventChannel::new();
        let image = signature_like(60, 30, 0.0);

        SimilarityPipeline::default()
            .compare_with_events(&image, &image, &sender)
            .unwrap();
        drop(sender);

        let stages: Vec<PipelineStage> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Pipeline(PipelineEvent::StageCompleted { stage }) => Some(stage),
                _ => None,
            })
            .collect();

        assert_eq!(
            stages,
            vec![
                PipelineStage::Grayscale,
                PipelineStage::Resize,
                PipelineStage::Similarity,
                PipelineStage::Overlap,
            ]
        );
    }
}
