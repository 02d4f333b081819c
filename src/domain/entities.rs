//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

pub type PostId = i64;
pub type CategoryId = i64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Storage key or absolute URL; empty when the post has no thumbnail.
    pub thumbnail_image_key: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A category as it appears inside a post's association list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedCategory {
    pub id: CategoryId,
    pub name: String,
}

/// A post together with every category currently associated with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithCategories {
    pub post: PostRecord,
    pub categories: Vec<AssignedCategory>,
}
