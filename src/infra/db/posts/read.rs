use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::{AssignedCategory, PostId, PostRecord, PostWithCategories};

use super::super::{SqliteRepositories, map_sqlx_error};
use super::types::{PostCategoryRow, PostRow};

impl SqliteRepositories {
    async fn load_categories(
        &self,
        post_ids: &[PostId],
    ) -> Result<HashMap<PostId, Vec<AssignedCategory>>, RepoError> {
        let mut grouped: HashMap<PostId, Vec<AssignedCategory>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT pc.post_id, pc.category_id, c.name \
             FROM post_categories pc \
             INNER JOIN categories c ON c.id = pc.category_id \
             WHERE pc.post_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in post_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY pc.id ASC");

        let rows = qb
            .build_query_as::<PostCategoryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        for row in rows {
            grouped
                .entry(row.post_id)
                .or_default()
                .push(row.into_assigned());
        }
        Ok(grouped)
    }
}

fn attach(post: PostRecord, grouped: &mut HashMap<PostId, Vec<AssignedCategory>>) -> PostWithCategories {
    let categories = grouped.remove(&post.id).unwrap_or_default();
    PostWithCategories { post, categories }
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn list_posts(&self) -> Result<Vec<PostWithCategories>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, thumbnail_image_key, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let ids: Vec<PostId> = rows.iter().map(|row| row.id).collect();
        let mut grouped = self.load_categories(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| attach(PostRecord::from(row), &mut grouped))
            .collect())
    }

    async fn find_post(&self, id: PostId) -> Result<Option<PostWithCategories>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, thumbnail_image_key, created_at, updated_at
            FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut grouped = self.load_categories(&[row.id]).await?;
        Ok(Some(attach(PostRecord::from(row), &mut grouped)))
    }
}
