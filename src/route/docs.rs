use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::{
    route::books::{self, BookResponse, BooksResponse, MessageResponse},
    state::ApiState,
    types::{Book, BookChanges, NewBook},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        books::create_book::create_book,
        books::list_books::list_books,
        books::get_book::get_book,
        books::update_book::update_book,
        books::delete_book::delete_book,
    ),
    components(schemas(
        Book,
        NewBook,
        BookChanges,
        BookResponse,
        BooksResponse,
        MessageResponse
    )),
    tags((name = "books", description = "Book records keyed by isbn"))
)]
pub struct ApiDoc;

pub fn app() -> Router<ApiState> {
    Router::<ApiState>::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
