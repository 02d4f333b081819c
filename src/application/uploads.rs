use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

const THUMBNAIL_PREFIX: &str = "private";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key")]
    InvalidKey,
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error("object not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Object written by an [`ObjectStorage`] backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub checksum: String,
    pub size_bytes: u64,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<StoredObject, StorageError>;

    /// Publicly reachable URL for an object key.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedThumbnail {
    pub key: String,
    pub url: String,
}

#[derive(Clone)]
pub struct ThumbnailUploadService {
    storage: Arc<dyn ObjectStorage>,
}

impl ThumbnailUploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Stores a thumbnail under a freshly generated key and returns where it can be fetched.
    pub async fn upload(
        &self,
        actor: &str,
        original_name: Option<&str>,
        data: Bytes,
    ) -> Result<UploadedThumbnail, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let key = thumbnail_key(original_name);
        let stored = self.storage.put(&key, data).await?;
        info!(
            target = "kiroku::admin::uploads",
            actor,
            key = %stored.key,
            size_bytes = stored.size_bytes,
            checksum = %stored.checksum,
            "thumbnail stored"
        );

        Ok(UploadedThumbnail {
            url: self.storage.public_url(&stored.key),
            key: stored.key,
        })
    }
}

fn thumbnail_key(original_name: Option<&str>) -> String {
    let identifier = Uuid::new_v4();
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.trim_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{THUMBNAIL_PREFIX}/{identifier}.{ext}"),
        None => format!("{THUMBNAIL_PREFIX}/{identifier}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn put(&self, key: &str, data: Bytes) -> Result<StoredObject, StorageError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(StoredObject {
                key: key.to_string(),
                checksum: "abc".into(),
                size_bytes: data.len() as u64,
            })
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://cdn.test/{key}")
        }
    }

    #[test]
    fn key_keeps_lowercased_extension() {
        let key = thumbnail_key(Some("Cover.PNG"));
        assert!(key.starts_with("private/"));
        assert!(key.ends_with(".png"));
        assert!(!thumbnail_key(Some("../weird.p/ng")).contains(".."));
        assert_eq!(thumbnail_key(None).matches('.').count(), 0);
    }

    #[tokio::test]
    async fn upload_returns_key_and_public_url() {
        let storage = Arc::new(MemoryStorage::default());
        let service = ThumbnailUploadService::new(storage.clone());

        let uploaded = service
            .upload("admin", Some("a.jpg"), Bytes::from_static(b"img"))
            .await
            .expect("upload");

        assert_eq!(uploaded.url, format!("http://cdn.test/{}", uploaded.key));
        assert_eq!(storage.keys.lock().unwrap().as_slice(), [uploaded.key]);
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let service = ThumbnailUploadService::new(Arc::new(MemoryStorage::default()));
        let err = service
            .upload("admin", Some("a.jpg"), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptyPayload));
    }
}
