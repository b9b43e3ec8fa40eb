// Public video pages. Serving them triggers the auto-update when one is due.
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::FeedError;
use crate::middleware::auto_update::auto_update_middleware;
use crate::models::video::VideoSummary;
use crate::AppState;

pub fn video_routes() -> Router {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/:video_id", get(get_video))
        .layer(axum::middleware::from_fn(auto_update_middleware))
}

pub async fn list_videos(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, FeedError> {
    let videos: Vec<VideoSummary> = state
        .videos
        .list()
        .await?
        .into_iter()
        .map(VideoSummary::from)
        .collect();

    Ok(Json(json!({ "success": true, "videos": videos })))
}

pub async fn get_video(
    Extension(state): Extension<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<Value>, FeedError> {
    let video = state
        .videos
        .find_by_video_id(&video_id)
        .await?
        .ok_or(FeedError::NotFound)?;
    let link = video.link();

    Ok(Json(json!({ "success": true, "video": video, "link": link })))
}
