// Admin API: YouTube settings tab, manual sync and stored videos
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::error::FeedError;
use crate::handlers::youtube::session_id;
use crate::middleware::auth::admin_auth_middleware;
use crate::models::auth::Claims;
use crate::models::settings::{SettingsUpdate, SettingsView, SiteYouTubeConfig, UpdateIntervalUnit};
use crate::services::token_manager::TokenManager;
use crate::AppState;

pub fn admin_routes() -> Router {
    Router::new()
        .route("/admin/youtube/settings", get(get_settings).put(update_settings))
        .route("/admin/youtube/auth-url", get(get_auth_url))
        .route("/admin/youtube/sync", post(sync_now))
        .route("/admin/youtube-videos", get(list_videos))
        .route("/admin/youtube-videos/:video_id", delete(delete_video))
        .layer(axum::middleware::from_fn(admin_auth_middleware))
}

/// Builds the settings tab. When the app credentials are set but no token is stored, an
/// authorization link is generated (which writes a fresh state into the session).
fn settings_view(
    state: &AppState,
    cookies: &Cookies,
    config: &SiteYouTubeConfig,
) -> Result<SettingsView, FeedError> {
    let connected = TokenManager::is_authenticated(config);
    let auth_url = if config.credentials().is_some() && !connected {
        Some(
            state
                .tokens
                .build_authorization_url(config, &state.sessions, &session_id(cookies))?,
        )
    } else {
        None
    };

    Ok(SettingsView {
        app_id: config.app_id.clone(),
        has_app_secret: config.app_secret.is_some(),
        connected,
        auth_url,
        auto_update: config.auto_update,
        update_interval: config.update_interval,
        update_interval_unit: config.update_interval_unit,
        update_interval_units: UpdateIntervalUnit::ALL.to_vec(),
        last_saved: config.last_saved,
    })
}

pub async fn get_settings(
    Extension(state): Extension<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, FeedError> {
    let config = state.settings.load().await?;
    let view = settings_view(&state, &cookies, &config)?;

    Ok(Json(json!({ "success": true, "settings": view })))
}

pub async fn update_settings(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    cookies: Cookies,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Value>, FeedError> {
    let mut config = state.settings.load().await?;
    let token_cleared = config.apply_update(update)?;
    state.settings.save(&config).await?;

    if token_cleared {
        tracing::info!(admin = %claims.sub, "YouTube app credentials changed, stored token cleared");
    } else {
        tracing::info!(admin = %claims.sub, "YouTube settings updated");
    }

    let view = settings_view(&state, &cookies, &config)?;
    Ok(Json(json!({
        "success": true,
        "token_cleared": token_cleared,
        "settings": view
    })))
}

pub async fn get_auth_url(
    Extension(state): Extension<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, FeedError> {
    let config = state.settings.load().await?;
    let auth_url = state
        .tokens
        .build_authorization_url(&config, &state.sessions, &session_id(&cookies))?;

    Ok(Json(json!({ "success": true, "auth_url": auth_url })))
}

/// Forced sync, same as the CLI task
pub async fn sync_now(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, FeedError> {
    let outcome = state.feed.run_auto_update(true).await?;
    Ok(Json(json!({ "success": true, "result": outcome })))
}

pub async fn list_videos(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, FeedError> {
    let videos = state.videos.list().await?;
    Ok(Json(json!({ "success": true, "videos": videos })))
}

pub async fn delete_video(
    Extension(state): Extension<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<Value>, FeedError> {
    if !state.videos.delete_by_video_id(&video_id).await? {
        return Err(FeedError::NotFound);
    }

    tracing::info!(video_id = %video_id, "YouTube video removed by admin");
    Ok(Json(json!({ "success": true })))
}
