//! # Registry Module
//!
//! In-memory store of named reference signatures.
//!
//! Keys are unique. Uploading under an existing name replaces the stored
//! image (last write wins) but keeps the name's listing position, so the
//! name picker does not reshuffle while a user re-uploads.

use crate::error::RegistryError;
use chrono::{DateTime, Utc};
use image::RgbImage;
use indexmap::IndexMap;

/// A named reference signature
#[derive(Debug, Clone)]
pub struct Signature {
    /// Name the signature was uploaded under
    pub name: String,
    /// Decoded RGB pixels
    pub image: RgbImage,
    /// When this image was stored
    pub uploaded_at: DateTime<Utc>,
}

/// Name to signature mapping for one session
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    entries: IndexMap<String, Signature>,
}

impl SignatureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Store `image` under `name`, replacing any previous image.
    ///
    /// Returns `true` when an earlier upload was replaced. Callers validate
    /// the name and image before storing.
    pub fn put(&mut self, name: impl Into<String>, image: RgbImage) -> bool {
        let name = name.into();
        let signature = Signature {
            name: name.clone(),
            image,
            uploaded_at: Utc::now(),
        };
        self.entries.insert(name, signature).is_some()
    }

    /// Look up the image stored under `name`
    pub fn get(&self, name: &str) -> Result<&RgbImage, RegistryError> {
        self.signature(name).map(|signature| &signature.image)
    }

    /// Look up the full signature record stored under `name`
    pub fn signature(&self, name: &str) -> Result<&Signature, RegistryError> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// All stored names in upload order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Iterate over stored signatures in upload order
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(4, 3, Rgb([value, value, value]))
    }

    #[test]
    fn get_returns_stored_image() {
        let mut registry = SignatureRegistry::new();
        registry.put("alice", solid(10));

        assert_eq!(registry.get("alice").unwrap(), &solid(10));
    }

    #[test]
    fn put_overwrites_existing_name() {
        let mut registry = SignatureRegistry::new();

        assert!(!registry.put("alice", solid(10)));
        assert!(registry.put("alice", solid(200)));

        assert_eq!(registry.get("alice").unwrap(), &solid(200));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_missing_name_is_not_found() {
        let registry = SignatureRegistry::new();

        let error = registry.get("bob").unwrap_err();

        assert_eq!(
            error,
            RegistryError::NotFound {
                name: "bob".to_string()
            }
        );
    }

    #[test]
    fn names_keep_first_upload_order() {
        let mut registry = SignatureRegistry::new();
        registry.put("carol", solid(1));
        registry.put("alice", solid(2));
        registry.put("bob", solid(3));
        registry.put("carol", solid(4));

        assert_eq!(registry.names(), vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn registries_are_isolated() {
        let mut first = SignatureRegistry::new();
        let second = SignatureRegistry::new();
        first.put("alice", solid(1));

        assert!(second.is_empty());
        assert!(second.get("alice").is_err());
    }

    #[test]
    fn overwrite_refreshes_upload_time() {
        let mut registry = SignatureRegistry::new();
        registry.put("alice", solid(1));
        let first = registry.signature("alice").unwrap().uploaded_at;

        registry.put("alice", solid(2));
        let second = registry.signature("alice").unwrap().uploaded_at;

        assert!(second >= first);
    }
}
