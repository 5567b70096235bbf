//! # Reporter Module
//!
//! Explains a comparison to the user.
//!
//! A score alone does not build trust; the user also sees each step the
//! pipeline took:
//! 1. **Original** signatures as uploaded
//! 2. **Grayscale** conversions
//! 3. **Resized** canonical images the score is computed on
//! 4. **Overlapped** blend of the two resized images

mod message;
mod visualization;

pub use message::{format_score, result_message, upload_message};
pub use visualization::{similarity_bar, SimilarityTier, GOOD_TIER_MIN, MEDIUM_TIER_MIN};

use crate::core::pipeline::{Classification, ComparisonResult};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Section of the stepwise comparison view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageSection {
    Original,
    Grayscale,
    Resized,
    Overlapped,
}

impl std::fmt::Display for StageSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageSection::Original => write!(f, "Original Signatures"),
            StageSection::Grayscale => write!(f, "Grayscale Images"),
            StageSection::Resized => write!(f, "Resized Images"),
            StageSection::Overlapped => write!(f, "Overlapped Images"),
        }
    }
}

/// One captioned image of the stepwise view
#[derive(Debug, Clone)]
pub struct StageView {
    pub section: StageSection,
    pub caption: &'static str,
    pub image: DynamicImage,
}

/// Display collaborator: shows an image with a caption.
pub trait StageSink {
    fn show(&mut self, view: &StageView);
}

/// Sink that keeps every view, for tests and headless callers
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub views: Vec<StageView>,
}

impl StageSink for CollectingSink {
    fn show(&mut self, view: &StageView) {
        self.views.push(view.clone());
    }
}

/// Build the stepwise views in display order
pub fn stage_views(
    original_a: &RgbImage,
    original_b: &RgbImage,
    result: &ComparisonResult,
) -> Vec<StageView> {
    let view = |section: StageSection, caption: &'static str, image: DynamicImage| StageView {
        section,
        caption,
        image,
    };

    vec![
        view(
            StageSection::Original,
            "Original Signature 1",
            DynamicImage::ImageRgb8(original_a.clone()),
        ),
        view(
            StageSection::Original,
            "Original Signature 2",
            DynamicImage::ImageRgb8(original_b.clone()),
        ),
        view(
            StageSection::Grayscale,
            "Grayscale Signature 1",
            DynamicImage::ImageLuma8(result.grayscale_a.clone()),
        ),
        view(
            StageSection::Grayscale,
            "Grayscale Signature 2",
            DynamicImage::ImageLuma8(result.grayscale_b.clone()),
        ),
        view(
            StageSection::Resized,
            "Resized Signature 1",
            DynamicImage::ImageLuma8(result.resized_a.clone()),
        ),
        view(
            StageSection::Resized,
            "Resized Signature 2",
            DynamicImage::ImageLuma8(result.resized_b.clone()),
        ),
        view(
            StageSection::Overlapped,
            "Overlapped Signatures",
            DynamicImage::ImageLuma8(result.overlap.clone()),
        ),
    ]
}

/// Size of one displayed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    pub section: StageSection,
    pub caption: String,
    pub width: u32,
    pub height: u32,
}

/// Serializable outcome of a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Name of the stored reference signature
    pub reference: String,
    pub score: f64,
    pub classification: Classification,
    pub tier: SimilarityTier,
    /// One-line verdict
    pub message: String,
    pub stages: Vec<StageSummary>,
}

impl ComparisonReport {
    pub fn new(reference: impl Into<String>, result: &ComparisonResult, views: &[StageView]) -> Self {
        Self {
            reference: reference.into(),
            score: result.score,
            classification: result.classification,
            tier: SimilarityTier::from_score(result.score),
            message: result_message(result.score, result.classification),
            stages: views
                .iter()
                .map(|view| StageSummary {
                    section: view.section,
                    caption: view.caption.to_string(),
                    width: view.image.width(),
                    height: view.image.height(),
                })
                .collect(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.classification.is_match()
    }
}
