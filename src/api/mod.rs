pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::cache::CacheStore;
use crate::email::Mailer;
use crate::llm::CompletionBackend;

/// Everything a handler needs, injected at construction time.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheStore,
    pub llm: Arc<dyn CompletionBackend>,
    pub mailer: Arc<dyn Mailer>,
}

pub fn router(state: AppState) -> Router {
    // The frontend is served from a separate origin, so CORS stays wide open
    // just like the read-only API it fronts.
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/stock-data", get(handlers::stock_data))
        .route("/api/events", get(handlers::events))
        .route("/api/events-summary", get(handlers::events_summary))
        .route("/api/send-email", post(handlers::send_email))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
