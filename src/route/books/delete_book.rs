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

use super::MessageResponse;

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Isbn of the book")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    ),
    tag = "books"
)]
pub async fn delete_book(
    ApiPath(isbn): ApiPath<String>,
    State(state): State<ApiState>,
) -> Result<MessageResponse, ApiError> {
    state
        .books()
        .delete(&isbn)
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(MessageResponse {
        message: String::from("Book deleted"),
    })
}
