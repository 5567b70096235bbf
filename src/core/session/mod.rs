//! # Session Module
//!
//! The upload and compare interactions of one user session.
//!
//! A `Session` owns its registry and pipeline, so every caller (CLI loop,
//! GUI, test) works on isolated state. All errors are recoverable: the
//! session stays usable after any failed upload or comparison.

use crate::core::decode::ImageDecoder;
use crate::core::pipeline::SimilarityPipeline;
use crate::core::registry::SignatureRegistry;
use crate::core::reporter::{stage_views, upload_message, ComparisonReport, StageSink};
use crate::error::{InputError, RegistryError, Result, SignatureMatchError};
use crate::events::{
    null_sender, ComparisonSummary, Event, EventSender, PipelineEvent, RegistryEvent,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub name: String,
    /// An earlier signature with this name was replaced
    pub replaced: bool,
    pub width: u32,
    pub height: u32,
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        upload_message(&self.name)
    }
}

/// One user's signature matching session
pub struct Session {
    registry: SignatureRegistry,
    pipeline: SimilarityPipeline,
    events: EventSender,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with an empty registry and the default pipeline
    pub fn new() -> Self {
        Self::with_pipeline(SimilarityPipeline::default())
    }

    pub fn with_pipeline(pipeline: SimilarityPipeline) -> Self {
        Self {
            registry: SignatureRegistry::new(),
            pipeline,
            events: null_sender(),
        }
    }

    /// Report uploads and comparison progress to `events`
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    /// Names available for comparison, in upload order
    pub fn names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Upload a reference signature.
    ///
    /// A blank name or missing image is an informational `MissingInput`.
    pub fn upload(&mut self, name: Option<&str>, image: Option<&[u8]>) -> Result<UploadOutcome> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(InputError::MissingInput {
                field: "both name and signature file to upload",
            })?;
        let bytes = image
            .filter(|b| !b.is_empty())
            .ok_or(InputError::MissingInput {
                field: "both name and signature file to upload",
            })?;

        let decoded = ImageDecoder::decode_bytes(bytes).map_err(|e| {
            warn!(name, error = %e, "signature upload failed");
            e
        })?;
        let (width, height) = decoded.dimensions();

        let replaced = self.registry.put(name, decoded);
        info!(name, width, height, replaced, "stored signature");
        self.events.send(Event::Registry(RegistryEvent::SignatureStored {
            name: name.to_string(),
            replaced,
        }));

        Ok(UploadOutcome {
            name: name.to_string(),
            replaced,
            width,
            height,
        })
    }

    /// Compare an uploaded image against the stored signature `name`.
    ///
    /// Checks run in the order the user meets them: nothing uploaded yet,
    /// no second image, then unknown name. Each stage image is passed to
    /// `sink` once the comparison succeeds.
    pub fn compare(
        &self,
        name: Option<&str>,
        image: Option<&[u8]>,
        sink: &mut dyn StageSink,
    ) -> Result<ComparisonReport> {
        if self.registry.is_empty() {
            return Err(RegistryError::NoSignatures.into());
        }

        let bytes = image
            .filter(|b| !b.is_empty())
            .ok_or(InputError::MissingInput {
                field: "Signature 2 to compare",
            })?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(InputError::MissingInput {
                field: "the name of Signature 1",
            })?;

        let reference = self.registry.get(name).map_err(|e| {
            self.events.send(Event::Registry(RegistryEvent::LookupFailed {
                name: name.to_string(),
            }));
            e
        })?;

        let candidate = ImageDecoder::decode_bytes(bytes)?;

        let start = Instant::now();
        self.events.send(Event::Pipeline(PipelineEvent::Started {
            reference: name.to_string(),
        }));

        let result = self
            .pipeline
            .compare_with_events(reference, &candidate, &self.events)
            .map_err(|e| {
                self.events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                e
            })?;

        let views = stage_views(reference, &candidate, &result);
        for view in &views {
            sink.show(view);
        }

        let report = ComparisonReport::new(name, &result, &views);
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(reference = name, score = report.score, duration_ms, "comparison finished");

        self.events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: ComparisonSummary {
                reference: name.to_string(),
                score: report.score,
                classification: report.classification,
                duration_ms,
            },
        }));

        Ok(report)
    }
}

/// Turn an error into the guidance text shown to the user
pub fn user_guidance(error: &SignatureMatchError) -> String {
    match error {
        SignatureMatchError::Image(_) => {
            format!("Failed to upload signature. {}", error)
        }
        _ => error.to_string(),
    }
}
