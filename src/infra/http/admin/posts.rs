use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kiroku_api_types::{
    CreatedResponse, MessageResponse, PostListResponse, PostResponse, PostWriteRequest,
};

use crate::application::admin::posts::{CreatePostCommand, UpdatePostCommand};
use crate::application::identity::Identity;
use crate::infra::http::error::ApiError;
use crate::infra::http::extract::{JsonBody, ResourceId};
use crate::infra::http::state::AdminState;

use super::{POST_NOT_FOUND, post_to_api};

pub async fn list_posts(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .posts
        .list_posts()
        .await
        .map_err(|err| post_to_api("infra::http::admin::list_posts", err))?;

    Ok(Json(PostListResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

pub async fn show_post(
    State(state): State<AdminState>,
    ResourceId(id): ResourceId,
) -> Result<impl IntoResponse, ApiError> {
    const SOURCE: &str = "infra::http::admin::show_post";

    let post = state
        .posts
        .find_post(id)
        .await
        .map_err(|err| post_to_api(SOURCE, err))?
        .ok_or_else(|| ApiError::not_found(SOURCE, POST_NOT_FOUND))?;

    Ok(Json(PostResponse { post: post.into() }))
}

pub async fn create_post(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<PostWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePostCommand {
        title: payload.title,
        content: payload.content,
        thumbnail_image_key: payload.thumbnail_image_key,
        category_ids: payload.categories.iter().map(|c| c.id).collect(),
    };

    let post = state
        .posts
        .create_post(identity.actor(), command)
        .await
        .map_err(|err| post_to_api("infra::http::admin::create_post", err))?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: post.id })))
}

pub async fn update_post(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    ResourceId(id): ResourceId,
    JsonBody(payload): JsonBody<PostWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdatePostCommand {
        id,
        title: payload.title,
        content: payload.content,
        thumbnail_image_key: payload.thumbnail_image_key,
        category_ids: payload.categories.iter().map(|c| c.id).collect(),
    };

    state
        .posts
        .update_post(identity.actor(), command)
        .await
        .map_err(|err| post_to_api("infra::http::admin::update_post", err))?;

    Ok(Json(MessageResponse::ok()))
}

pub async fn delete_post(
    State(state): State<AdminState>,
    Extension(identity): Extension<Identity>,
    ResourceId(id): ResourceId,
) -> Result<impl IntoResponse, ApiError> {
    state
        .posts
        .delete_post(identity.actor(), id)
        .await
        .map_err(|err| post_to_api("infra::http::admin::delete_post", err))?;

    Ok(Json(MessageResponse::ok()))
}
