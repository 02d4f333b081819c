use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, RepoError, UpdateCategoryParams,
};
use crate::domain::categories::normalize_category_name;
use crate::domain::entities::{CategoryId, CategoryRecord};
use crate::domain::error::DomainError;
use crate::domain::time::now_utc;

#[derive(Debug, Error)]
pub enum AdminCategoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct UpdateCategoryCommand {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Clone)]
pub struct AdminCategoryService {
    reader: Arc<dyn CategoriesRepo>,
    writer: Arc<dyn CategoriesWriteRepo>,
}

impl AdminCategoryService {
    pub fn new(reader: Arc<dyn CategoriesRepo>, writer: Arc<dyn CategoriesWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, AdminCategoryError> {
        self.reader
            .list_categories()
            .await
            .map_err(AdminCategoryError::from)
    }

    pub async fn find_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<CategoryRecord>, AdminCategoryError> {
        self.reader
            .find_category(id)
            .await
            .map_err(AdminCategoryError::from)
    }

    pub async fn create_category(
        &self,
        actor: &str,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, AdminCategoryError> {
        let name = normalize_category_name(&command.name)?;

        let category = self
            .writer
            .create_category(CreateCategoryParams {
                name,
                created_at: now_utc(),
            })
            .await?;
        info!(
            target = "kiroku::admin::categories",
            actor,
            category_id = category.id,
            "category created"
        );
        Ok(category)
    }

    pub async fn update_category(
        &self,
        actor: &str,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, AdminCategoryError> {
        let name = normalize_category_name(&command.name)?;

        let category = self
            .writer
            .update_category(UpdateCategoryParams {
                id: command.id,
                name,
                updated_at: now_utc(),
            })
            .await?;
        info!(
            target = "kiroku::admin::categories",
            actor,
            category_id = category.id,
            "category updated"
        );
        Ok(category)
    }

    pub async fn delete_category(
        &self,
        actor: &str,
        id: CategoryId,
    ) -> Result<(), AdminCategoryError> {
        self.writer.delete_category(id).await?;
        info!(
            target = "kiroku::admin::categories",
            actor,
            category_id = id,
            "category deleted"
        );
        Ok(())
    }
}
