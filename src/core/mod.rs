//! # Core Module
//!
//! The UI-agnostic signature matching engine.
//!
//! ## Modules
//! - `decode` - Turns uploaded bytes into RGB pixel buffers
//! - `registry` - Stores named reference signatures
//! - `pipeline` - Grayscale, resize, SSIM score and overlap
//! - `reporter` - Verdict messages, tiers and the stepwise view
//! - `session` - Upload and compare interactions for one user

pub mod decode;
pub mod pipeline;
pub mod registry;
pub mod reporter;
pub mod session;

// Re-export commonly used types
pub use decode::ImageDecoder;
pub use pipeline::{compare, Classification, ComparisonResult, SimilarityPipeline};
pub use registry::{Signature, SignatureRegistry};
pub use reporter::{ComparisonReport, SimilarityTier, StageSink, StageView};
pub use session::{Session, UploadOutcome};
