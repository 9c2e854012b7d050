use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    cli_args::CliArgs,
    error::ErrorVerbosity,
    repository::{BookRepository, DatabaseConfig},
    server::{self, ServerConfig},
    state::ApiState,
    types::NewBook,
};

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

#[tokio::test]
async fn cli_args_override_config_file() {
    let cli_args = CliArgs {
        config_file: String::from("config.example.yaml"),
        database_url: Some(String::from("sqlite::memory:")),
        socket_address: Some("0.0.0.0:8080".parse().unwrap()),
    };

    let config = ServerConfig::from_config_file(&cli_args.config_file)
        .await
        .unwrap()
        .with_cli_args(&cli_args);

    let expected = ServerConfig::new(
        "0.0.0.0:8080".parse().unwrap(),
        ErrorVerbosity::Full,
        DatabaseConfig {
            url: String::from("sqlite::memory:"),
            max_connections: 5,
        },
    );

    assert_eq!(config, expected);
}

/// A router over a fresh in-memory database holding the book with isbn `123`.
pub struct TestApp {
    pub router: Router,
    pub books: BookRepository,
}

impl TestApp {
    pub async fn new() -> Self {
        let books = BookRepository::connect(&DatabaseConfig::in_memory())
            .await
            .expect("In-memory database is not available");

        books
            .create(NewBook {
                isbn: String::from("123"),
                amazon_url: String::from("https://www.amazon.com/test"),
                author: String::from("test jones"),
                language: String::from("english"),
                pages: 100,
                publisher: String::from("test people"),
                title: String::from("test book"),
                year: 2024,
            })
            .await
            .expect("Failed to seed book");

        let router = server::app(ApiState::new(ErrorVerbosity::Full, books.clone()));

        Self { router, books }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Body is not collectable")
            .to_bytes();

        let body = match bytes.is_empty() {
            true => Value::Null,
            false => serde_json::from_slice(&bytes).expect("Body is not JSON"),
        };

        (status, body)
    }
}
