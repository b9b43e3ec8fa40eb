// Persistence seams for video records and the site settings row
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FeedError;
use crate::models::settings::SiteYouTubeConfig;
use crate::models::video::{VideoFields, VideoRecord};
use crate::models::youtube::StoredToken;

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::{PgSettingsStore, PgVideoStore};

/// Result of [`VideoStore::upsert`]
#[derive(Debug, Clone)]
pub struct Upserted {
    pub video: VideoRecord,
    /// False when a row with the same `video_id` already existed
    pub created: bool,
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn find_by_video_id(&self, video_id: &str) -> Result<Option<VideoRecord>, FeedError>;

    /// Creates the record, or overwrites every mapped field of the one with this `video_id`,
    /// in a single atomic write keyed on the unique `video_id`
    async fn upsert(&self, fields: &VideoFields) -> Result<Upserted, FeedError>;

    /// Returns whether a record was removed
    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool, FeedError>;

    /// Newest first
    async fn list(&self) -> Result<Vec<VideoRecord>, FeedError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<SiteYouTubeConfig, FeedError>;

    /// Writes every field in one statement
    async fn save(&self, config: &SiteYouTubeConfig) -> Result<(), FeedError>;

    async fn store_token(&self, token: Option<&StoredToken>) -> Result<(), FeedError>;

    async fn mark_synced(&self, at: DateTime<Utc>) -> Result<(), FeedError>;
}
