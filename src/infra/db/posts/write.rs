use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{CategoryId, PostId, PostRecord};

use super::super::{SqliteRepositories, map_sqlx_error};
use super::types::PostRow;

async fn insert_post_categories(
    tx: &mut Transaction<'_, Sqlite>,
    post_id: PostId,
    category_ids: &[CategoryId],
    at: OffsetDateTime,
) -> Result<(), RepoError> {
    for category_id in category_ids {
        sqlx::query(
            r#"
            INSERT INTO post_categories (post_id, category_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(post_id)
        .bind(*category_id)
        .bind(at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

#[async_trait]
impl PostsWriteRepo for SqliteRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            title,
            content,
            thumbnail_image_key,
            category_ids,
            created_at,
        } = params;

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, thumbnail_image_key, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, title, content, thumbnail_image_key, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(thumbnail_image_key)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        insert_post_categories(&mut tx, row.id, &category_ids, created_at).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let UpdatePostParams {
            id,
            title,
            content,
            thumbnail_image_key,
            category_ids,
            updated_at,
        } = params;

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = ?2,
                content = ?3,
                thumbnail_image_key = ?4,
                updated_at = ?5
            WHERE id = ?1
            RETURNING id, title, content, thumbnail_image_key, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(thumbnail_image_key)
        .bind(updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        sqlx::query("DELETE FROM post_categories WHERE post_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        insert_post_categories(&mut tx, id, &category_ids, updated_at).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(PostRecord::from(row))
    }

    async fn delete_post(&self, id: PostId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::{CategoriesWriteRepo, CreateCategoryParams, PostsRepo};
    use crate::domain::time::now_utc;
    use crate::infra::db::test_support::repositories;

    async fn category(repos: &SqliteRepositories, name: &str) -> CategoryId {
        repos
            .create_category(CreateCategoryParams {
                name: name.into(),
                created_at: now_utc(),
            })
            .await
            .expect("create category")
            .id
    }

    async fn post(repos: &SqliteRepositories, category_ids: Vec<CategoryId>) -> PostId {
        repos
            .create_post(CreatePostParams {
                title: "Hello".into(),
                content: "<p>world</p>".into(),
                thumbnail_image_key: String::new(),
                category_ids,
                created_at: now_utc(),
            })
            .await
            .expect("create post")
            .id
    }

    fn update(id: PostId, category_ids: Vec<CategoryId>) -> UpdatePostParams {
        UpdatePostParams {
            id,
            title: "Edited".into(),
            content: "<p>edited</p>".into(),
            thumbnail_image_key: "private/cover.png".into(),
            category_ids,
            updated_at: now_utc(),
        }
    }

    async fn assigned(repos: &SqliteRepositories, id: PostId) -> Vec<CategoryId> {
        repos
            .find_post(id)
            .await
            .expect("find")
            .expect("post exists")
            .categories
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    #[tokio::test]
    async fn update_replaces_category_set() {
        let (repos, _dir) = repositories().await;
        let a = category(&repos, "A").await;
        let b = category(&repos, "B").await;
        let c = category(&repos, "C").await;
        let id = post(&repos, vec![a, b]).await;

        repos.update_post(update(id, vec![c])).await.expect("update");
        assert_eq!(assigned(&repos, id).await, vec![c]);

        repos.update_post(update(id, Vec::new())).await.expect("update");
        assert!(assigned(&repos, id).await.is_empty());
    }

    #[tokio::test]
    async fn failed_category_insert_rolls_back_whole_update() {
        let (repos, _dir) = repositories().await;
        let a = category(&repos, "A").await;
        let id = post(&repos, vec![a]).await;

        let err = repos
            .update_post(update(id, vec![a, 9999]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidInput { .. }));

        let current = repos.find_post(id).await.expect("find").expect("exists");
        assert_eq!(current.post.title, "Hello");
        assert_eq!(assigned(&repos, id).await, vec![a]);
    }

    #[tokio::test]
    async fn deleting_category_or_post_cascades_associations() {
        let (repos, _dir) = repositories().await;
        let a = category(&repos, "A").await;
        let b = category(&repos, "B").await;
        let id = post(&repos, vec![a, b]).await;

        repos.delete_category(a).await.expect("delete category");
        assert_eq!(assigned(&repos, id).await, vec![b]);

        repos.delete_post(id).await.expect("delete post");
        assert!(repos.find_post(id).await.expect("find").is_none());
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM post_categories")
            .fetch_one(repos.pool())
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn update_of_missing_post_is_not_found() {
        let (repos, _dir) = repositories().await;
        let err = repos.update_post(update(77, Vec::new())).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}
