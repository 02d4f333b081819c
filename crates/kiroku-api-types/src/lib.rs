//! Request and response bodies shared by the kiroku server and its clients.
//!
//! Wire names are camelCase; every error body is `{ "message": ... }`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type PostId = i64;
pub type CategoryId = i64;

/// A category as embedded inside a post's category list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostCategoryLink {
    pub category: CategorySummary,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub post_categories: Vec<PostCategoryLink>,
}

impl PostBody {
    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.post_categories
            .iter()
            .map(|link| link.category.id)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    pub id: CategoryId,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostBody>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostResponse {
    pub post: PostBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryBody>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryResponse {
    pub category: CategoryBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWriteRequest {
    pub title: String,
    pub content: String,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_image_key: String,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryWriteRequest {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_write_request_accepts_legacy_thumbnail_field() {
        let body = r#"{"title":"t","content":"c","thumbnailUrl":"https://x/y.png","categories":[{"id":3}]}"#;
        let request: PostWriteRequest = serde_json::from_str(body).expect("parse");
        assert_eq!(request.thumbnail_image_key, "https://x/y.png");
        assert_eq!(request.categories, vec![CategoryRef { id: 3 }]);
    }

    #[test]
    fn post_body_serializes_nested_categories_in_camel_case() {
        let post = PostBody {
            id: 1,
            title: "hello".into(),
            content: "<p>x</p>".into(),
            thumbnail_image_key: String::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            post_categories: vec![PostCategoryLink {
                category: CategorySummary {
                    id: 7,
                    name: "Tech".into(),
                },
            }],
        };

        let value = serde_json::to_value(&post).expect("serialize");
        assert_eq!(value["thumbnailImageKey"], "");
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
        assert_eq!(value["postCategories"][0]["category"]["name"], "Tech");
        assert_eq!(post.category_ids(), vec![7]);
    }
}
