//! # Gilt Server
//!
//! HTTP server for the gilt yield engine.
//!
//! ## Features
//!
//! - `GET /gilts/api/gilts`: conventional gilts in issue, split into active and past
//! - `POST /gilts/api/yield`: pre-tax, post-tax and gross-equivalent yields
//! - Health endpoint
//! - Optional static front-end under `/gilts`
//! - Configuration via TOML file
//!
//! ## Usage
//!
//! ```ignore
//! use gilt_server::Server;
//!
//! let server = Server::new(config, source);
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use gilt_traits::GiltReferenceSource;

pub use config::ServerConfig;

/// The gilt yield server.
pub struct Server {
    config: ServerConfig,
    source: Arc<dyn GiltReferenceSource>,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig, source: Arc<dyn GiltReferenceSource>) -> Self {
        Self { config, source }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let mut router = routes::create_router(Arc::clone(&self.source));
        if self.config.serve_static {
            router = routes::with_static_files(router, &self.config.static_dir);
        }

        router
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config.host.parse().unwrap_or([127, 0, 0, 1].into()),
            self.config.port,
        );

        info!("Starting gilt server on {}", addr);
        if self.config.serve_static {
            info!("Serving static files from {}", self.config.static_dir.display());
        }

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}
