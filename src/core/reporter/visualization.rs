//! Similarity tiers and text visualizations.
//!
//! Tiers only drive colour-coding. They use their own boundaries and are
//! independent of the match decision.

use serde::{Deserialize, Serialize};

/// Lowest score shown in the green tier
pub const GOOD_TIER_MIN: f64 = 80.0;

/// Lowest score shown in the yellow tier
pub const MEDIUM_TIER_MIN: f64 = 50.0;

/// Presentation bucket for a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityTier {
    /// score >= 80
    Good,
    /// 50 <= score < 80
    Medium,
    /// score < 50
    Poor,
}

impl SimilarityTier {
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_TIER_MIN {
            SimilarityTier::Good
        } else if score >= MEDIUM_TIER_MIN {
            SimilarityTier::Medium
        } else {
            SimilarityTier::Poor
        }
    }

    /// Colour name used when rendering the tier
    pub fn color(&self) -> &'static str {
        match self {
            SimilarityTier::Good => "green",
            SimilarityTier::Medium => "yellow",
            SimilarityTier::Poor => "red",
        }
    }
}

impl std::fmt::Display for SimilarityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityTier::Good => write!(f, "good"),
            SimilarityTier::Medium => write!(f, "medium"),
            SimilarityTier::Poor => write!(f, "poor"),
        }
    }
}

/// Compact similarity indicator, e.g. `[████████░░] 80%`.
///
/// Negative scores render as an empty bar.
pub fn similarity_bar(similarity_percent: f64) -> String {
    let filled = (similarity_percent.clamp(0.0, 100.0) / 10.0).round() as usize;
    let empty = 10 - filled;

    format!(
        "[{}{}] {:.0}%",
        "█".repeat(filled),
        "░".repeat(empty),
        similarity_percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(SimilarityTier::from_score(100.0), SimilarityTier::Good);
        assert_eq!(SimilarityTier::from_score(80.0), SimilarityTier::Good);
        assert_eq!(SimilarityTier::from_score(79.99), SimilarityTier::Medium);
        assert_eq!(SimilarityTier::from_score(50.0), SimilarityTier::Medium);
        assert_eq!(SimilarityTier::from_score(49.99), SimilarityTier::Poor);
        assert_eq!(SimilarityTier::from_score(-20.0), SimilarityTier::Poor);
    }

    #[test]
    fn tier_colors() {
        assert_eq!(SimilarityTier::Good.color(), "green");
        assert_eq!(SimilarityTier::Medium.color(), "yellow");
        assert_eq!(SimilarityTier::Poor.color(), "red");
    }

    #[test]
    fn similarity_bar_full() {
        let bar = similarity_bar(100.0);

        assert!(bar.contains("██████████"));
        assert!(bar.contains("100%"));
    }

    #[test]
    fn similarity_bar_partial() {
        let bar = similarity_bar(50.0);

        assert!(bar.contains("█████"));
        assert!(bar.contains("░░░░░"));
        assert!(bar.contains("50%"));
    }

    #[test]
    fn similarity_bar_negative_is_empty() {
        let bar = similarity_bar(-12.0);

        assert!(bar.contains("░░░░░░░░░░"));
        assert!(!bar.contains('█'));
        assert!(bar.contains("-12%"));
    }
}
