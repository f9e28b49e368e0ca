//! HTTP server

use crate::error::{Result, WebError};
use crate::i18n::Translations;
use crate::{contact, pages};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, read-only request state
#[derive(Debug, Clone)]
pub struct AppState {
    pub translations: Arc<Translations>,
}

impl AppState {
    pub fn new(translations: Translations) -> Self {
        Self {
            translations: Arc::new(translations),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Translations::builtin())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/contact", get(contact::show_form).post(contact::submit_form))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(pages::index_page())
}

/// Serve until the process is stopped
pub async fn run_server(config: ServerConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| WebError::Bind {
            addr: config.bind,
            source,
        })?;
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, create_router(state))
        .await
        .map_err(WebError::Serve)
}
