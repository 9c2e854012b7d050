use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use axum::{middleware, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    decompression::RequestDecompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::{
    cli_args::CliArgs,
    error::ErrorVerbosity,
    middleware::{
        method_not_allowed::method_not_allowed, not_found::not_found,
        trace_response_body::trace_response_body,
    },
    repository::{BookRepository, DatabaseConfig},
    route,
    state::ApiState,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[source] serde_yaml::Error),
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    socket_address: SocketAddr,
    error_verbosity: ErrorVerbosity,
    database: DatabaseConfig,
}

impl ServerConfig {
    pub fn new(
        socket_address: SocketAddr,
        error_verbosity: ErrorVerbosity,
        database: DatabaseConfig,
    ) -> Self {
        Self {
            socket_address,
            error_verbosity,
            database,
        }
    }

    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::Read)?;

        serde_yaml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Lets command line arguments and environment variables win over the file.
    pub fn with_cli_args(mut self, cli_args: &CliArgs) -> Self {
        if let Some(url) = &cli_args.database_url {
            self.database.url = url.clone();
        }

        if let Some(socket_address) = cli_args.socket_address {
            self.socket_address = socket_address;
        }

        self
    }
}

/// Builds the full application router on top of the given state.
pub fn app(state: ApiState) -> Router {
    Router::new()
        .merge(route::books::app::app())
        .merge(route::docs::app())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            method_not_allowed,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace_response_body,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
                )
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let books = BookRepository::connect(&self.config.database)
            .await
            .context("Failed to connect to database")?;

        let state = ApiState::new(self.config.error_verbosity, books.clone());

        tracing::info!(addr = %self.config.socket_address, "Starting server");

        let listener = TcpListener::bind(&self.config.socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        books.close().await;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");

        tracing::info!("CTRL+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;

        tracing::info!("SIGTERM received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
