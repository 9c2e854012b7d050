use std::borrow::Cow;

use axum::{
    extract::rejection::PathRejection,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::{repository::BookRepositoryError, validation::Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns an empty response with [`StatusCode::NO_CONTENT`] for all errors.
    None,
    /// Server returns only the appropriate status code.
    StatusCode,
    /// Server returns only the message with the appropriate status code.
    Message,
    /// Server returns the message, the error type with cleared error content and the appropriate status code.
    Type,
    /// Server returns the message, the error type with the error content and the appropriate status code.
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

/// Anything that knows how verbose errors should be.
///
/// Extractors and middlewares are generic over their state and only need this.
pub trait ErrorVerbosityProvider {
    fn error_verbosity(&self) -> ErrorVerbosity;
}

#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    #[serde(flatten)]
    error: ApiError,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiErrorMessage {
    message: &'static str,
}

impl From<ApiErrorResponse> for ApiErrorMessage {
    fn from(response: ApiErrorResponse) -> Self {
        ApiErrorMessage {
            message: response.message,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let headers = self.error.headers();
        let status_code = self.error.status_code();

        match self.error.verbosity() {
            ErrorVerbosity::None => StatusCode::NO_CONTENT.into_response(),
            ErrorVerbosity::StatusCode => (status_code, headers).into_response(),
            ErrorVerbosity::Message => {
                (status_code, headers, Json(ApiErrorMessage::from(self))).into_response()
            }
            ErrorVerbosity::Type | ErrorVerbosity::Full => {
                (status_code, headers, Json(self)).into_response()
            }
        }
    }
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "error_type", content = "error")]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when an internal server error occurs.
    InternalServerError(InternalServerError),
    /// Body error
    ///
    /// This error is returned when the body is not valid JSON.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path is not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when the body is valid JSON but violates the expected schema or constraints.
    Validation(ValidationError),
    /// Book error
    ///
    /// This error is returned when a book operation can not be carried out.
    Book(BookError),
    /// Method not allowed
    ///
    /// This error is returned when the method is not allowed.
    MethodNotAllowed(MethodNotAllowedError),
    /// Not found error
    ///
    /// This error is returned when the requested resource is not found.
    NotFound(NotFoundError),
}

impl ApiError {
    /// Maps a repository failure to the matching API error.
    pub fn from_repository_error(verbosity: ErrorVerbosity, err: BookRepositoryError) -> Self {
        match err {
            BookRepositoryError::NotFound(isbn) => {
                BookError::new(verbosity, BookErrorType::NotFound { isbn }).into()
            }
            BookRepositoryError::Conflict(isbn) => {
                BookError::new(verbosity, BookErrorType::Conflict { isbn }).into()
            }
            err @ BookRepositoryError::Database(_) => {
                InternalServerError::from_generic_error(verbosity, err).into()
            }
        }
    }

    fn verbosity(&self) -> ErrorVerbosity {
        match self {
            ApiError::InternalServerError(err) => err.verbosity,
            ApiError::Body(err) => err.verbosity,
            ApiError::Path(err) => err.verbosity,
            ApiError::Validation(err) => err.verbosity,
            ApiError::Book(err) => err.verbosity,
            ApiError::MethodNotAllowed(err) => err.verbosity,
            ApiError::NotFound(err) => err.verbosity,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => "An internal server error has occurred",
            ApiError::Body(_) => "Failed to parse request body",
            ApiError::Path(_) => "Failed to parse path parameters",
            ApiError::Validation(_) => "Request body failed validation",
            ApiError::Book(err) => err.message(),
            ApiError::MethodNotAllowed(_) => "Method not allowed",
            ApiError::NotFound(_) => "The requested resource was not found",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(err) => err.status_code(),
            ApiError::Body(err) => err.status_code(),
            ApiError::Path(err) => err.status_code(),
            ApiError::Validation(err) => err.status_code(),
            ApiError::Book(err) => err.status_code(),
            ApiError::MethodNotAllowed(err) => err.status_code(),
            ApiError::NotFound(err) => err.status_code(),
        }
    }

    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let message = match error.verbosity() {
            ErrorVerbosity::None => "",
            _ => error.message(),
        };

        ApiErrorResponse { error, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse::from(self).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct InternalServerError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            verbosity,
            internal_server_error,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Serialize)]
pub struct BodyError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    body_error_reason: Option<String>,
    body_expected_schema: Option<String>,
}

impl BodyError {
    pub fn new(
        verbosity: ErrorVerbosity,
        body_error_reason: String,
        body_expected_schema: String,
    ) -> Self {
        let (body_error_reason, body_expected_schema) =
            match verbosity.should_generate_error_reason() {
                true => (Some(body_error_reason), Some(body_expected_schema)),
                false => (None, None),
            };

        BodyError {
            verbosity,
            body_error_reason,
            body_expected_schema,
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub struct PathError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn new(verbosity: ErrorVerbosity, path_error_reason: String) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then_some(path_error_reason);

        PathError {
            verbosity,
            path_error_reason,
        }
    }

    pub fn from_path_rejection(verbosity: ErrorVerbosity, rejection: PathRejection) -> Self {
        Self::new(verbosity, rejection.body_text())
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    violations: Option<Vec<Violation>>,
}

impl ValidationError {
    pub fn new(verbosity: ErrorVerbosity, violations: Vec<Violation>) -> Self {
        let violations = verbosity
            .should_generate_error_reason()
            .then_some(violations);

        ValidationError {
            verbosity,
            violations,
        }
    }

    pub fn from_validation_errors(
        verbosity: ErrorVerbosity,
        errors: validator::ValidationErrors,
    ) -> Self {
        Self::new(verbosity, Violation::from_validation_errors(&errors))
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Serialize)]
pub enum BookErrorType {
    NotFound {
        #[serde(skip)]
        isbn: String,
    },
    Conflict {
        #[serde(skip)]
        isbn: String,
    },
}

#[derive(Debug, Serialize)]
pub struct BookError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
    book_error_type: BookErrorType,
    book_error_reason: Option<Cow<'static, str>>,
}

impl BookError {
    pub fn new(verbosity: ErrorVerbosity, book_error_type: BookErrorType) -> Self {
        let book_error_reason = verbosity
            .should_generate_error_reason()
            .then(|| Self::reason(&book_error_type));

        BookError {
            verbosity,
            book_error_type,
            book_error_reason,
        }
    }

    fn reason(book_error_type: &BookErrorType) -> Cow<'static, str> {
        match book_error_type {
            BookErrorType::NotFound { isbn } => {
                Cow::Owned(format!("Book with isbn {isbn} not found"))
            }
            BookErrorType::Conflict { isbn } => {
                Cow::Owned(format!("Book with isbn {isbn} already exists"))
            }
        }
    }

    fn message(&self) -> &'static str {
        match self.book_error_type {
            BookErrorType::NotFound { .. } => "Book not found",
            BookErrorType::Conflict { .. } => "Book already exists",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.book_error_type {
            BookErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
            BookErrorType::Conflict { .. } => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MethodNotAllowedError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl MethodNotAllowedError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        MethodNotAllowedError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundError {
    #[serde(skip)]
    verbosity: ErrorVerbosity,
}

impl NotFoundError {
    pub fn new(verbosity: ErrorVerbosity) -> Self {
        NotFoundError { verbosity }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(error: ApiError) -> (StatusCode, Vec<u8>) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Body is not collectable")
            .to_bytes();

        (status, bytes.to_vec())
    }

    fn not_found(verbosity: ErrorVerbosity) -> ApiError {
        BookError::new(
            verbosity,
            BookErrorType::NotFound {
                isbn: String::from("999"),
            },
        )
        .into()
    }

    #[tokio::test]
    async fn none_verbosity_hides_everything() {
        let (status, body) = render(not_found(ErrorVerbosity::None)).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn status_code_verbosity_has_no_body() {
        let (status, body) = render(not_found(ErrorVerbosity::StatusCode)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn message_verbosity_renders_message_only() {
        let (status, body) = render(not_found(ErrorVerbosity::Message)).await;
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "message": "Book not found" }));
    }

    #[tokio::test]
    async fn type_verbosity_clears_reason() {
        let (_, body) = render(not_found(ErrorVerbosity::Type)).await;
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["error_type"], "Book");
        assert!(body["error"]["book_error_reason"].is_null());
    }

    #[tokio::test]
    async fn full_verbosity_renders_reason() {
        let (_, body) = render(not_found(ErrorVerbosity::Full)).await;
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(body["error_type"], "Book");
        assert_eq!(
            body["error"]["book_error_reason"],
            "Book with isbn 999 not found"
        );
        assert_eq!(body["message"], "Book not found");
    }

    #[tokio::test]
    async fn conflict_maps_to_409() {
        let error = ApiError::from_repository_error(
            ErrorVerbosity::Full,
            BookRepositoryError::Conflict(String::from("123")),
        );
        let (status, _) = render(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_failure_maps_to_500() {
        let error = ApiError::from_repository_error(
            ErrorVerbosity::Full,
            BookRepositoryError::Database(sqlx::Error::PoolClosed),
        );
        let (status, _) = render(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
