//! Resolves stored thumbnail keys to displayable URLs.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::cache::{CacheKey, RequestCache, SharedError};
use crate::error::ClientError;

pub const DEFAULT_BUCKET: &str = "post_thumbnail";

#[async_trait]
pub trait PublicUrlSource: Send + Sync {
    async fn public_url(&self, key: &str) -> Result<String, ClientError>;
}

/// Builds `{storage_url}/storage/{bucket}/{key}` without a network call.
#[derive(Debug, Clone)]
pub struct StoragePublicUrl {
    storage_url: Url,
    bucket: String,
}

impl StoragePublicUrl {
    pub fn new(storage_url: Url, bucket: impl Into<String>) -> Self {
        Self {
            storage_url,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl PublicUrlSource for StoragePublicUrl {
    async fn public_url(&self, key: &str) -> Result<String, ClientError> {
        let base = self.storage_url.as_str().trim_end_matches('/');
        let key = key.trim_start_matches('/');
        Ok(format!("{base}/storage/{}/{key}", self.bucket))
    }
}

pub struct ThumbnailResolver<S> {
    source: Arc<S>,
    cache: RequestCache<String>,
}

impl<S> ThumbnailResolver<S>
where
    S: PublicUrlSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            cache: RequestCache::new(),
        }
    }

    /// `None` for an empty key; absolute URLs are returned unchanged.
    pub async fn resolve(&self, key: &str) -> Result<Option<String>, SharedError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        if key.starts_with("http://") || key.starts_with("https://") {
            return Ok(Some(key.to_string()));
        }

        let source = self.source.clone();
        self.cache
            .read(&CacheKey::public(Some(key)), move |key, _| {
                let key = key.to_string();
                async move { source.public_url(&key).await }
            })
            .await
    }
}
