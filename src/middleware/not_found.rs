use axum::extract::State;

use crate::{
    error::{ApiError, ErrorVerbosityProvider, NotFoundError},
    state::ApiState,
};

/// Fallback for unknown routes.
pub async fn not_found(State(state): State<ApiState>) -> ApiError {
    NotFoundError::new(state.error_verbosity()).into()
}
