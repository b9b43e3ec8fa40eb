use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::AppState;

/// Runs the YouTube auto-update before serving a public page, if one is due.
/// Failures are logged; the page is served regardless.
pub async fn auto_update_middleware(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(e) = state.feed.run_auto_update(false).await {
        tracing::error!("YouTube auto-update failed: {}", e);
    }

    next.run(request).await
}
