use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    state::ApiState,
};

use super::BooksResponse;

impl IntoResponse for BooksResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/books",
    responses(
        (status = 200, description = "All books ordered by title", body = BooksResponse)
    ),
    tag = "books"
)]
pub async fn list_books(State(state): State<ApiState>) -> Result<BooksResponse, ApiError> {
    let books = state
        .books()
        .list()
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(BooksResponse { books })
}
