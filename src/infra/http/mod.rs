mod admin;
mod error;
mod extract;
mod middleware;
mod models;
mod public;
mod state;

pub use admin::build_admin_router;
pub use error::ApiError;
pub use public::build_public_router;
pub use state::{AdminState, HttpState, RouterState};

use axum::Router;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use axum::response::{IntoResponse, Response};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Full application router: public reads, storage, health and the admin API.
pub fn build_router(state: RouterState) -> Router {
    Router::new()
        .merge(build_public_router(state.clone()))
        .merge(build_admin_router(state.clone()))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
