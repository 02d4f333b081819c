//! Token-gated admin API for posts, categories and thumbnail uploads.

mod auth;
mod categories;
mod posts;
mod uploads;

pub use auth::admin_auth;
pub use categories::*;
pub use posts::*;
pub use uploads::*;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::admin::categories::AdminCategoryError;
use crate::application::admin::posts::AdminPostError;

use super::error::ApiError;
use super::state::RouterState;

const POST_NOT_FOUND: &str = "記事が見つかりません。";
const CATEGORY_NOT_FOUND: &str = "カテゴリーが見つかりません。";

pub fn build_admin_router(state: RouterState) -> Router<RouterState> {
    let auth_state = state.admin.clone();
    let upload_body_limit = state.admin.upload_body_limit;

    Router::new()
        .route("/api/admin/posts", get(list_posts).post(create_post))
        .route(
            "/api/admin/posts/{id}",
            get(show_post).put(update_post).delete(delete_post),
        )
        .route(
            "/api/admin/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            get(show_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route(
            "/api/admin/uploads",
            post(upload_thumbnail).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(auth_state, admin_auth))
}

/// Every write or lookup failure is reported as a 400 carrying the error's message.
fn post_to_api(source: &'static str, err: AdminPostError) -> ApiError {
    ApiError::from_error(source, axum::http::StatusCode::BAD_REQUEST, &err)
}

fn category_to_api(source: &'static str, err: AdminCategoryError) -> ApiError {
    ApiError::from_error(source, axum::http::StatusCode::BAD_REQUEST, &err)
}
