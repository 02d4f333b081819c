use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kiroku_api_types::{
    CategoryListResponse, CategoryResponse, CategoryWriteRequest, CreatedResponse,
    MessageResponse,
};

use crate::application::admin::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::application::identity::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::{JsonBody, ResourceId};
use crate::infra::http::state::AdminState;

use super::{CATEGORY_NOT_FOUND, category_to_api};

pub async fn list_categories(
    State(state): State<AdminState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .categories
        .list_categories()
        .await
        .map_err(|err| category_to_api("infra::http::admin::list_categories", err))?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

pub async fn show_category(
    State(state): State<AdminState>,
    ResourceId(id): ResourceId,
) -> Result<impl IntoResponse, ApiError> {
    const SOURCE: &str = "infra::http::admin::show_category";

    let category = state
        .categories
        .find_category(id)
        .await
        .map_err(|err| category_to_api(SOURCE, err))?
        .ok_or_else(|| ApiError::not_found(SOURCE, CATEGORY_NOT_FOUND))?;

    Ok(Json(CategoryResponse {
        category: category.into(),
    }))
}

pub async fn create_category(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<CategoryWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create_category(
            identity.actor(),
            CreateCategoryCommand { name: payload.name },
        )
        .await
        .map_err(|err| category_to_api("infra::http::admin::create_category", err))?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: category.id })))
}

pub async fn update_category(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    ResourceId(id): ResourceId,
    JsonBody(payload): JsonBody<CategoryWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .categories
        .update_category(
            identity.actor(),
            UpdateCategoryCommand {
                id,
                name: payload.name,
            },
        )
        .await
        .map_err(|err| category_to_api("infra::http::admin::update_category", err))?;

    Ok(Json(MessageResponse::ok()))
}

pub async fn delete_category(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    ResourceId(id): ResourceId,
) -> Result<impl IntoResponse, ApiError> {
    state
        .categories
        .delete_category(identity.actor(), id)
        .await
        .map_err(|err| category_to_api("infra::http::admin::delete_category", err))?;

    Ok(Json(MessageResponse::ok()))
}
