//! # Error Module
//!
//! User-friendly error types for the signature matcher.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - names, paths, what went wrong
//! - **Guide the user** - missing input and unknown names read as prompts,
//!   not crashes

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SignatureMatchError {
    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SignatureMatchError {
    /// True for errors that only ask the user for more input.
    ///
    /// These are shown as an informational prompt rather than a failure.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            SignatureMatchError::Input(_)
                | SignatureMatchError::Registry(RegistryError::NoSignatures)
        )
    }

    /// True when the error came from an unreadable or malformed image
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, SignatureMatchError::Image(_))
    }

    /// True when a lookup named a signature that was never uploaded
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SignatureMatchError::Registry(RegistryError::NotFound { .. })
        )
    }
}

/// Errors from the signature registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No signature stored under '{name}'. Please upload it first in the 'Upload' tab.")]
    NotFound { name: String },

    #[error("No signatures available. Please upload signatures first in the 'Upload' tab.")]
    NoSignatures,
}

/// Errors from decoding or transforming an image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("upload is empty")]
    EmptyInput,

    #[error("failed to decode image: {reason}")]
    DecodeFailed { reason: String },

    #[error("failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("resize failed: {0}")]
    ResizeFailed(String),
}

/// Errors for form input that was left out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please provide {field}.")]
    MissingInput { field: &'static str },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SignatureMatchError>;
