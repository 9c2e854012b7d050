use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, ErrorVerbosityProvider},
    extractor::validated_json::ValidatedJson,
    state::ApiState,
    types::NewBook,
};

use super::BookResponse;

pub struct CreateBookResponse(BookResponse);

impl IntoResponse for CreateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid book"),
        (status = 409, description = "A book with this isbn already exists")
    ),
    tag = "books"
)]
pub async fn create_book(
    State(state): State<ApiState>,
    ValidatedJson(new_book): ValidatedJson<NewBook>,
) -> Result<CreateBookResponse, ApiError> {
    let book = state
        .books()
        .create(new_book)
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(CreateBookResponse(BookResponse { book }))
}
