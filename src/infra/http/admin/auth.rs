use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics::counter;

use crate::application::identity::{AuthError, extract_token};
use crate::infra::http::error::ApiError;
use crate::infra::http::state::AdminState;
use crate::infra::telemetry::AUTH_REJECTED_TOTAL;

const SOURCE: &str = "infra::http::admin::auth";

/// Verifies the caller before any admin handler runs; rejected requests never reach the store.
pub async fn admin_auth(
    State(state): State<AdminState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let verified = match extract_token(header) {
        Ok(token) => state.identity.verify(token).await,
        Err(err) => Err(err),
    };

    let identity = match verified {
        Ok(identity) => identity,
        Err(err) => {
            let reason = match &err {
                AuthError::Missing => "missing",
                AuthError::Invalid(_) => "invalid",
                AuthError::Unavailable(_) => "unavailable",
            };
            counter!(AUTH_REJECTED_TOTAL, "reason" => reason).increment(1);
            return ApiError::unauthorized(SOURCE, err.to_string()).into_response();
        }
    };

    request.extensions_mut().insert(identity.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(identity);
    response
}
