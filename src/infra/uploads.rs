//! Filesystem-backed object storage for thumbnails.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use url::Url;

use crate::application::uploads::{ObjectStorage, StorageError, StoredObject};

/// Errors that can occur while interacting with the upload storage backend.
#[derive(Debug, Error)]
pub enum UploadStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("uploaded file is empty")]
    EmptyPayload,
}

impl From<UploadStorageError> for StorageError {
    fn from(err: UploadStorageError) -> Self {
        match err {
            UploadStorageError::InvalidPath => StorageError::InvalidKey,
            UploadStorageError::EmptyPayload => StorageError::EmptyPayload,
            UploadStorageError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                StorageError::NotFound
            }
            UploadStorageError::Io(io) => StorageError::Backend(io.to_string()),
        }
    }
}

/// Objects live under `<root>/<bucket>/<key>` and are served from
/// `<public_base_url>/storage/<bucket>/<key>`.
#[derive(Debug)]
pub struct UploadStorage {
    root: PathBuf,
    bucket: String,
    public_base_url: Url,
}

impl UploadStorage {
    /// Initialise storage rooted at the provided directory, creating the bucket if necessary.
    pub fn new(
        root: PathBuf,
        bucket: impl Into<String>,
        public_base_url: Url,
    ) -> Result<Self, std::io::Error> {
        let bucket = bucket.into();
        std::fs::create_dir_all(root.join(&bucket))?;
        Ok(Self {
            root,
            bucket,
            public_base_url,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn store(&self, key: &str, data: Bytes) -> Result<StoredObject, UploadStorageError> {
        if data.is_empty() {
            return Err(UploadStorageError::EmptyPayload);
        }

        let absolute = self.resolve(key)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&absolute).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        let checksum = hex::encode(Sha256::digest(&data));
        Ok(StoredObject {
            key: key.to_string(),
            checksum,
            size_bytes: data.len() as u64,
        })
    }

    /// Attempt to read the stored payload into memory.
    pub async fn read(&self, key: &str) -> Result<Bytes, UploadStorageError> {
        let absolute = self.resolve(key)?;
        let data = fs::read(absolute).await?;
        Ok(Bytes::from(data))
    }

    /// Resolve the absolute filesystem path for a key inside the bucket.
    fn resolve(&self, key: &str) -> Result<PathBuf, UploadStorageError> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative.components().any(|component| {
                matches!(
                    component,
                    Component::ParentDir | Component::Prefix(_) | Component::RootDir
                )
            })
        {
            return Err(UploadStorageError::InvalidPath);
        }

        Ok(self.root.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStorage for UploadStorage {
    async fn put(&self, key: &str, data: Bytes) -> Result<StoredObject, StorageError> {
        Ok(self.store(key, data).await?)
    }

    fn public_url(&self, key: &str) -> String {
        let base = self.public_base_url.as_str().trim_end_matches('/');
        format!("{base}/storage/{}/{key}", self.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> UploadStorage {
        UploadStorage::new(
            dir.path().to_path_buf(),
            "post_thumbnail",
            Url::parse("https://blog.example.com/").expect("url"),
        )
        .expect("storage")
    }

    #[tokio::test]
    async fn stores_and_reads_back_objects() {
        let dir = TempDir::new().expect("temp dir");
        let storage = storage(&dir);

        let stored = storage
            .put("private/a.png", Bytes::from_static(b"png"))
            .await
            .expect("put");
        assert_eq!(stored.size_bytes, 3);
        assert_eq!(stored.checksum.len(), 64);
        assert!(dir.path().join("post_thumbnail/private/a.png").exists());

        let data = storage.read("private/a.png").await.expect("read");
        assert_eq!(&data[..], b"png");
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let dir = TempDir::new().expect("temp dir");
        let storage = storage(&dir);

        for key in ["../escape.png", "/etc/passwd", ""] {
            let err = storage.read(key).await.unwrap_err();
            assert!(matches!(err, UploadStorageError::InvalidPath), "{key}");
        }
    }

    #[test]
    fn public_url_includes_bucket() {
        let dir = TempDir::new().expect("temp dir");
        assert_eq!(
            storage(&dir).public_url("private/a.png"),
            "https://blog.example.com/storage/post_thumbnail/private/a.png"
        );
    }
}
