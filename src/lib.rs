//! # Signature Matcher
//!
//! Compares two handwritten signatures and explains the comparison.
//!
//! ## How It Works
//! - Upload a named reference signature
//! - Upload a second signature and pick the reference to compare against
//! - Both are converted to grayscale, resized to 300x300 and scored with SSIM
//! - A score above 80% is a match; every intermediate image is shown
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Registry, comparison pipeline and reporting
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SignatureMatchError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // Ignore the error if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}
