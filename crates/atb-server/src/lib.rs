//! AudioTensorBoard server library logic.
//!
//! | Module         | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | [`api`]        | JSON endpoints for scalars, images, audio and tags   |
//! | [`background`] | Periodic event file reload task                      |
//! | [`cli`]        | Command-line arguments                               |
//! | [`config`]     | TOML and environment configuration                   |
//! | [`net`]        | Listener binding with default-port fallback          |
//! | [`page`]       | HTML index page                                      |
//! | [`serve`]      | Startup and graceful shutdown                        |

pub mod api;
pub mod background;
pub mod cli;
pub mod config;
pub mod net;
pub mod page;
pub mod serve;

use atb_events::{AudioRecord, EventStore, EventsError, ImageRecord, ScalarRecord};
use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded event store, absent only when the server is wired up
    /// without one.
    store: Option<Arc<EventStore>>,
}

impl AppState {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store: Some(store) }
    }

    /// State with no event store; every data endpoint answers HTTP 500.
    pub fn without_store() -> Self {
        Self { store: None }
    }

    pub fn store(&self) -> Option<&Arc<EventStore>> {
        self.store.as_ref()
    }
}

/// Errors that abort server startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Events(#[from] EventsError),

    #[error(transparent)]
    Bind(#[from] net::BindError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("event store initialization task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(page::index_handler))
        .route("/api/tags", get(api::get_tags_handler))
        .route(
            "/api/scalars/{*tag}",
            get(api::tag_records_handler::<ScalarRecord>),
        )
        .route(
            "/api/images/{*tag}",
            get(api::tag_records_handler::<ImageRecord>),
        )
        .route(
            "/api/audio/{*tag}",
            get(api::tag_records_handler::<AudioRecord>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
