use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use kiroku_api_types::{PostListResponse, PostResponse};

use crate::application::feed::FeedError;
use crate::infra::uploads::UploadStorageError;

use super::db_health_response;
use super::error::ApiError;
use super::extract::ResourceId;
use super::state::{HttpState, RouterState};

const POST_NOT_FOUND: &str = "記事が見つかりません。";
const OBJECT_NOT_FOUND: &str = "ファイルが見つかりません。";

pub fn build_public_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/{id}", get(show_post))
        .route("/storage/{bucket}/{*key}", get(serve_object))
        .route("/_health/db", get(db_health))
        .with_state(state)
}

fn feed_to_api(source: &'static str, err: FeedError) -> ApiError {
    ApiError::from_error(source, StatusCode::BAD_REQUEST, &err)
}

async fn list_posts(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .feed
        .list_posts()
        .await
        .map_err(|err| feed_to_api("infra::http::public::list_posts", err))?;

    Ok(Json(PostListResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

async fn show_post(
    State(state): State<HttpState>,
    ResourceId(id): ResourceId,
) -> Result<impl IntoResponse, ApiError> {
    const SOURCE: &str = "infra::http::public::show_post";

    let post = state
        .feed
        .find_post(id)
        .await
        .map_err(|err| feed_to_api(SOURCE, err))?
        .ok_or_else(|| ApiError::not_found(SOURCE, POST_NOT_FOUND))?;

    Ok(Json(PostResponse { post: post.into() }))
}

async fn serve_object(
    State(state): State<HttpState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    const SOURCE: &str = "infra::http::public::serve_object";

    if bucket != state.upload_storage.bucket() {
        return Err(ApiError::not_found(SOURCE, OBJECT_NOT_FOUND));
    }

    let data = state
        .upload_storage
        .read(&key)
        .await
        .map_err(|err| match err {
            UploadStorageError::InvalidPath => ApiError::not_found(SOURCE, OBJECT_NOT_FOUND),
            UploadStorageError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                ApiError::not_found(SOURCE, OBJECT_NOT_FOUND)
            }
            other => ApiError::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &other),
        })?;

    let content_type = mime_guess::from_path(&key).first_or_octet_stream();
    let mut response = data.into_response();
    if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    Ok(response)
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}
