use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider, MethodNotAllowedError},
    state::ApiState,
};

/// Middleware to map axum's `MethodNotAllowed` response to our [`ApiError`].
pub async fn method_not_allowed(
    State(state): State<ApiState>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let resp = next.run(req).await;

    match resp.status() {
        StatusCode::METHOD_NOT_ALLOWED => {
            Err(MethodNotAllowedError::new(state.error_verbosity()).into())
        }
        _ => Ok(resp),
    }
}
