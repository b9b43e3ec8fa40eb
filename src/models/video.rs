use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A YouTube upload mirrored into the local database, keyed by `video_id`
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct VideoRecord {
    pub id: i32,
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published: DateTime<Utc>,
    pub channel_title: String,
    pub channel_id: String,
    pub playlist_id: String,
    pub playlist_position: i32,
    pub thumbnail_url: Option<String>,
    pub thumbnail_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// URL where the video resides on YouTube
    pub fn link(&self) -> String {
        format!("{}{}", WATCH_URL_PREFIX, self.video_id)
    }
}

/// The snippet fields a sync maps onto a record. Used for both insert and in-place update.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFields {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published: DateTime<Utc>,
    pub channel_title: String,
    pub channel_id: String,
    pub playlist_id: String,
    pub playlist_position: i32,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub published: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub link: String,
}

impl From<VideoRecord> for VideoSummary {
    fn from(video: VideoRecord) -> Self {
        let link = video.link();
        Self {
            video_id: video.video_id,
            title: video.title,
            description: video.description,
            published: video.published,
            thumbnail_url: video.thumbnail_url,
            link,
        }
    }
}
