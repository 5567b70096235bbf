//! Event type definitions for progress reporting.

use crate::core::pipeline::Classification;
use serde::{Deserialize, Serialize};

/// All events emitted by a signature matching session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Registry changes
    Registry(RegistryEvent),
    /// Comparison pipeline progress
    Pipeline(PipelineEvent),
}

/// Events from the signature registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A signature was stored
    SignatureStored {
        name: String,
        /// An earlier upload under the same name was replaced
        replaced: bool,
    },
    /// A lookup named a signature that was never uploaded
    LookupFailed { name: String },
}

/// Events while comparing two signatures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Comparison has started
    Started { reference: String },
    /// A pipeline stage finished
    StageCompleted { stage: PipelineStage },
    /// Comparison completed
    Completed { summary: ComparisonSummary },
    /// Comparison failed
    Error { message: String },
}

/// Stages of the comparison pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Grayscale,
    Resize,
    Similarity,
    Overlap,
}

/// Summary of a finished comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Name of the stored reference signature
    pub reference: String,
    /// Similarity percentage
    pub score: f64,
    pub classification: Classification,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Grayscale => write!(f, "Grayscale"),
            PipelineStage::Resize => write!(f, "Resizing"),
            PipelineStage::Similarity => write!(f, "Scoring"),
            PipelineStage::Overlap => write!(f, "Overlapping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Registry(RegistryEvent::SignatureStored {
            name: "alice".to_string(),
            replaced: true,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Registry(RegistryEvent::SignatureStored { name, replaced }) => {
                assert_eq!(name, "alice");
                assert!(replaced);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn comparison_summary_is_serializable() {
        let summary = ComparisonSummary {
            reference: "bob".to_string(),
            score: 87.25,
            classification: Classification::Match,
            duration_ms: 12,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("87.25"));
        assert!(json.contains("\"Match\""));
    }

    #[test]
    fn stage_display() {
        assert_eq!(PipelineStage::Grayscale.to_string(), "Grayscale");
        assert_eq!(PipelineStage::Similarity.to_string(), "Scoring");
    }
}
