// Reconciles one uploads-playlist item into the local video records
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::FeedError;
use crate::models::video::{VideoFields, VideoRecord};
use crate::models::youtube::{PlaylistItem, Thumbnails};
use crate::store::VideoStore;

/// Invoked with a newly created record after it is durably persisted
pub trait VideoCreatedListener: Send + Sync {
    fn on_video_created(&self, video: &VideoRecord);
}

pub struct LoggingListener;

impl VideoCreatedListener for LoggingListener {
    fn on_video_created(&self, video: &VideoRecord) {
        tracing::info!(video_id = %video.video_id, title = %video.title, "New YouTube video stored");
    }
}

/// Highest resolution thumbnail available
pub fn select_thumbnail(thumbnails: &Thumbnails) -> Option<String> {
    [
        &thumbnails.maxres,
        &thumbnails.standard,
        &thumbnails.high,
        &thumbnails.medium,
        &thumbnails.default,
    ]
    .into_iter()
    .flatten()
    .next()
    .map(|thumbnail| thumbnail.url.clone())
}

/// Maps the snippet of a playlist item onto record columns
pub fn video_fields(item: &PlaylistItem) -> Result<VideoFields, FeedError> {
    let snippet = &item.snippet;
    if snippet.published_at.is_empty() {
        return Err(FeedError::Provider(format!(
            "missing publishedAt for video {}",
            item.video_id()
        )));
    }
    let published = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map_err(|e| {
            FeedError::Provider(format!(
                "invalid publishedAt '{}' for video {}: {}",
                snippet.published_at,
                item.video_id(),
                e
            ))
        })?
        .with_timezone(&Utc);

    Ok(VideoFields {
        video_id: snippet.resource_id.video_id.clone(),
        title: snippet.title.clone(),
        description: snippet.description.clone(),
        published,
        channel_title: snippet.channel_title.clone(),
        channel_id: snippet.channel_id.clone(),
        playlist_id: snippet.playlist_id.clone(),
        playlist_position: snippet.position,
        thumbnail_url: select_thumbnail(&snippet.thumbnails),
    })
}

/// Public items are created or overwritten in place; anything else removes the local record.
/// Returns the stored record, or none when the item is not public.
pub async fn reconcile_item(
    store: &dyn VideoStore,
    listeners: &[Arc<dyn VideoCreatedListener>],
    item: &PlaylistItem,
) -> Result<Option<VideoRecord>, FeedError> {
    if !item.is_public() {
        if store.delete_by_video_id(item.video_id()).await? {
            tracing::info!(video_id = %item.video_id(), "Removed YouTube video that is no longer public");
        }
        return Ok(None);
    }

    let fields = video_fields(item)?;

    let upserted = store.upsert(&fields).await?;
    if upserted.created {
        for listener in listeners {
            listener.on_video_created(&upserted.video);
        }
    } else {
        tracing::debug!(video_id = %upserted.video.video_id, "Updated YouTube video");
    }

    Ok(Some(upserted.video))
}
