use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{
        CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, RepoError,
        UpdateCategoryParams,
    },
    domain::entities::{CategoryId, CategoryRecord},
};

use super::{SqliteRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CategoriesRepo for SqliteRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRecord::from).collect())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }
}

#[async_trait]
impl CategoriesWriteRepo for SqliteRepositories {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, created_at, updated_at)
            VALUES (?1, ?2, ?2)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(params.name)
        .bind(params.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CategoryRecord::from(row))
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = ?2,
                updated_at = ?3
            WHERE id = ?1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(params.id)
        .bind(params.name)
        .bind(params.updated_at)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        Ok(CategoryRecord::from(row))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
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
    use time::Duration;

    use super::*;
    use crate::domain::time::now_utc;
    use crate::infra::db::test_support::repositories;

    #[tokio::test]
    async fn lists_newest_first_and_updates_in_place() {
        let (repos, _dir) = repositories().await;
        let earlier = now_utc() - Duration::minutes(5);

        let first = repos
            .create_category(CreateCategoryParams {
                name: "Old".into(),
                created_at: earlier,
            })
            .await
            .expect("create");
        let second = repos
            .create_category(CreateCategoryParams {
                name: "New".into(),
                created_at: now_utc(),
            })
            .await
            .expect("create");

        let listed = repos.list_categories().await.expect("list");
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let updated = repos
            .update_category(UpdateCategoryParams {
                id: first.id,
                name: "Renamed".into(),
                updated_at: now_utc(),
            })
            .await
            .expect("update");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.created_at, earlier);
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let (repos, _dir) = repositories().await;

        assert!(repos.find_category(42).await.expect("find").is_none());
        assert!(matches!(
            repos.delete_category(42).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            repos
                .update_category(UpdateCategoryParams {
                    id: 42,
                    name: "x".into(),
                    updated_at: now_utc(),
                })
                .await,
            Err(RepoError::NotFound)
        ));
    }
}
