use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    extractor::path::ApiPath,
    state::ApiState,
};

use super::BookResponse;

impl IntoResponse for BookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[utoipa::path(
    get,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Isbn of the book")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "Book not found")
    ),
    tag = "books"
)]
pub async fn get_book(
    ApiPath(isbn): ApiPath<String>,
    State(state): State<ApiState>,
) -> Result<BookResponse, ApiError> {
    let book = state
        .books()
        .get(&isbn)
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(BookResponse { book })
}
