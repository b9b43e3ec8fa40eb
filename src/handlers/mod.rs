// src/handlers/mod.rs
pub mod admin;
pub mod videos;
pub mod youtube;

use axum::{response::Json, routing::get, Extension, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;

use crate::middleware::logging::request_logging_middleware;
use crate::AppState;

/// Every route of the service with its shared state and layers
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(youtube::youtube_routes())
        .merge(videos::video_routes())
        .merge(admin::admin_routes())
        .route("/health", get(health_check))
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
