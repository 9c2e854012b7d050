use axum::extract::State;

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    extractor::{path::ApiPath, validated_json::ValidatedJson},
    state::ApiState,
    types::BookChanges,
};

use super::BookResponse;

#[utoipa::path(
    put,
    path = "/books/{isbn}",
    params(("isbn" = String, Path, description = "Isbn of the book")),
    request_body = BookChanges,
    responses(
        (status = 200, description = "The updated book", body = BookResponse),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Book not found")
    ),
    tag = "books"
)]
pub async fn update_book(
    ApiPath(isbn): ApiPath<String>,
    State(state): State<ApiState>,
    ValidatedJson(changes): ValidatedJson<BookChanges>,
) -> Result<BookResponse, ApiError> {
    let book = state
        .books()
        .update(&isbn, changes)
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(BookResponse { book })
}
