//! Asset Store: blob storage for product images.
//!
//! An asset is addressed by an opaque [`AssetRef`]. Stores accept a payload
//! only if it is an allowed image within the configured size limit, never
//! reuse a reference, and treat deletion of a missing object as success.
//!
//! Nothing here is transactional with the catalog database; callers order
//! their writes and issue compensating deletes instead.

pub mod image;
pub mod local;

use async_trait::async_trait;

use crate::error::CoreError;

pub use image::{detect_image, ImageKind};
pub use local::LocalAssetStore;

/// Default maximum accepted upload size (5 MiB).
pub const DEFAULT_MAX_ASSET_BYTES: usize = 5 * 1024 * 1024;

/// Opaque reference to one stored object.
///
/// References are bare file names (`<millis>-<random>.<ext>`); anything that
/// could escape the store root is rejected on parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef(String);

impl AssetRef {
    /// Parse a reference previously produced by a store (e.g. read back from the database).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let valid = !raw.is_empty()
            && raw != "."
            && raw != ".."
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(CoreError::InvalidAsset(format!(
                "'{raw}' is not a valid asset reference"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backend for uploaded images.
///
/// Implementations must be thread-safe; one instance is shared by every
/// request handler.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Validate and store a payload, returning a fresh reference.
    ///
    /// Fails with [`CoreError::InvalidAsset`] when the payload is empty, too
    /// large, or not an allowed image type, and with
    /// [`CoreError::Unavailable`] on I/O failure.
    async fn put(&self, data: &[u8], content_type: Option<&str>) -> Result<AssetRef, CoreError>;

    /// Remove an object. Missing objects are not an error.
    async fn delete(&self, asset: &AssetRef) -> Result<(), CoreError>;

    /// Map a reference to the location clients fetch it from. Pure.
    fn resolve(&self, asset: &AssetRef) -> String;

    /// Whether the object is currently stored.
    async fn exists(&self, asset: &AssetRef) -> Result<bool, CoreError>;
}
