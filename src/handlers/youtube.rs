// YouTube OAuth callback
// Completes the connection started from the admin settings screen

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

use crate::config::CALLBACK_PATH;
use crate::services::session::SESSION_COOKIE;
use crate::AppState;

pub fn youtube_routes() -> Router {
    Router::new().route(&format!("/{}", CALLBACK_PATH), get(youtube_oauth_callback))
}

#[derive(Deserialize)]
pub struct YouTubeCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Session ID from the cookie, creating the cookie when the browser has none yet
pub fn session_id(cookies: &Cookies) -> String {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        return cookie.value().to_string();
    }

    let id = Uuid::new_v4().to_string();
    let mut cookie = Cookie::new(SESSION_COOKIE, id.clone());
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookies.add(cookie);
    id
}

/// Handle YouTube OAuth callback.
/// Plain-text 400 on a bad request, redirect to the admin settings page once the token is stored.
pub async fn youtube_oauth_callback(
    Query(params): Query<YouTubeCallbackQuery>,
    Extension(state): Extension<Arc<AppState>>,
    cookies: Cookies,
) -> Response {
    // The pending state is single use, whatever the outcome
    let session_state = cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.take_state(cookie.value()));

    if let Some(error) = params.error {
        tracing::warn!("YouTube OAuth error: {}", error);
        return (StatusCode::BAD_REQUEST, format!("Authorization failed: {}", error)).into_response();
    }

    let result = state
        .tokens
        .handle_callback(
            state.settings.as_ref(),
            params.code.as_deref(),
            params.state.as_deref(),
            session_state.as_deref(),
        )
        .await;

    match result {
        Ok(_) => Redirect::to(&state.config.admin_settings_url()).into_response(),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!("YouTube OAuth callback failed: {}", e);
            }
            let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
                "Internal server error".to_string()
            } else {
                e.to_string()
            };
            (status, body).into_response()
        }
    }
}
