use time::OffsetDateTime;

use crate::domain::entities::{AssignedCategory, PostRecord};

#[derive(sqlx::FromRow)]
pub(super) struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            thumbnail_image_key: row.thumbnail_image_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One post/category association joined with the category name.
#[derive(sqlx::FromRow)]
pub(super) struct PostCategoryRow {
    pub post_id: i64,
    pub category_id: i64,
    pub name: String,
}

impl PostCategoryRow {
    pub fn into_assigned(self) -> AssignedCategory {
        AssignedCategory {
            id: self.category_id,
            name: self.name,
        }
    }
}
