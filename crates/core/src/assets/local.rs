//! Filesystem-backed [`AssetStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{detect_image, AssetRef, AssetStore};
use crate::error::CoreError;

/// How many fresh names to try before giving up on a colliding upload.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Stores each asset as a single file directly under `root`.
///
/// File names are `<unix millis>-<random u32>.<ext>` and are created with
/// `create_new`, so an existing object is never overwritten.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    public_path: String,
    max_bytes: usize,
}

impl LocalAssetStore {
    /// Create the store, making sure `root` exists.
    ///
    /// `public_path` is the URL prefix the directory is served under
    /// (e.g. `/uploads`).
    pub async fn open(
        root: impl Into<PathBuf>,
        public_path: &str,
        max_bytes: usize,
    ) -> Result<Self, CoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_path: public_path.trim_end_matches('/').to_string(),
            max_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, asset: &AssetRef) -> PathBuf {
        self.root.join(asset.as_str())
    }

    fn fresh_name(extension: &str) -> String {
        format!(
            "{}-{}.{extension}",
            chrono::Utc::now().timestamp_millis(),
            rand::random::<u32>()
        )
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(&self, data: &[u8], content_type: Option<&str>) -> Result<AssetRef, CoreError> {
        if data.is_empty() {
            return Err(CoreError::InvalidAsset("Image payload is empty".into()));
        }
        if data.len() > self.max_bytes {
            return Err(CoreError::InvalidAsset(format!(
                "Image is {} bytes; the limit is {} bytes",
                data.len(),
                self.max_bytes
            )));
        }
        let kind = detect_image(data, content_type)?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let asset = AssetRef(Self::fresh_name(kind.extension()));
            let path = self.path_for(&asset);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            let written = async {
                file.write_all(data).await?;
                file.sync_all().await
            }
            .await;

            if let Err(e) = written {
                // Never leave a truncated object behind.
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e.into());
            }

            tracing::debug!(asset = %asset, bytes = data.len(), mime = kind.mime(), "Stored asset");
            return Ok(asset);
        }

        Err(CoreError::Unavailable(
            "Could not allocate a unique asset name".into(),
        ))
    }

    async fn delete(&self, asset: &AssetRef) -> Result<(), CoreError> {
        match tokio::fs::remove_file(self.path_for(asset)).await {
            Ok(()) => {
                tracing::debug!(asset = %asset, "Deleted asset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, asset: &AssetRef) -> String {
        format!("{}/{}", self.public_path, asset)
    }

    async fn exists(&self, asset: &AssetRef) -> Result<bool, CoreError> {
        Ok(tokio::fs::try_exists(self.path_for(asset)).await?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::assets::image::fixtures::{JPEG, PNG};

    async fn store(dir: &tempfile::TempDir, max_bytes: usize) -> LocalAssetStore {
        LocalAssetStore::open(dir.path().join("uploads"), "/uploads/", max_bytes)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn put_writes_file_and_resolves_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 1024).await;

        let asset = store.put(PNG, Some("image/png")).await.unwrap();

        assert!(asset.as_str().ends_with(".png"));
        assert!(store.exists(&asset).await.unwrap());
        let on_disk = tokio::fs::read(store.root().join(asset.as_str())).await.unwrap();
        assert_eq!(on_disk, PNG);
        assert_eq!(store.resolve(&asset), format!("/uploads/{asset}"));
    }

    #[tokio::test]
    async fn put_never_reuses_references() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 1024).await;

        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            let asset = store.put(JPEG, None).await.unwrap();
            assert!(seen.insert(asset), "reference reused");
        }
    }

    #[tokio::test]
    async fn put_rejects_oversized_empty_and_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 16).await;

        assert_matches!(store.put(PNG, None).await, Err(CoreError::InvalidAsset(_)));
        assert_matches!(store.put(b"", None).await, Err(CoreError::InvalidAsset(_)));
        assert_matches!(
            store.put(b"hello", Some("text/plain")).await,
            Err(CoreError::InvalidAsset(_))
        );

        let mut entries = tokio::fs::read_dir(store.root()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none(), "nothing stored");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 1024).await;

        let asset = store.put(PNG, None).await.unwrap();
        store.delete(&asset).await.unwrap();
        assert!(!store.exists(&asset).await.unwrap());
        store.delete(&asset).await.unwrap();
    }
}
