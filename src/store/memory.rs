// In-memory stores for tests
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{SettingsStore, Upserted, VideoStore};
use crate::error::FeedError;
use crate::models::settings::SiteYouTubeConfig;
use crate::models::video::{VideoFields, VideoRecord};
use crate::models::youtube::StoredToken;

#[derive(Default)]
pub struct MemoryVideoStore {
    videos: Mutex<HashMap<String, VideoRecord>>,
    next_id: Mutex<i32>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.videos.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn find_by_video_id(&self, video_id: &str) -> Result<Option<VideoRecord>, FeedError> {
        Ok(self.videos.lock().unwrap().get(video_id).cloned())
    }

    async fn upsert(&self, fields: &VideoFields) -> Result<Upserted, FeedError> {
        // One lock for lookup and write, like ON CONFLICT
        let mut videos = self.videos.lock().unwrap();
        let now = Utc::now();

        if let Some(record) = videos.get_mut(&fields.video_id) {
            record.title = fields.title.clone();
            record.description = fields.description.clone();
            record.published = fields.published;
            record.channel_title = fields.channel_title.clone();
            record.channel_id = fields.channel_id.clone();
            record.playlist_id = fields.playlist_id.clone();
            record.playlist_position = fields.playlist_position;
            record.thumbnail_url = fields.thumbnail_url.clone();
            record.updated_at = now;
            return Ok(Upserted {
                video: record.clone(),
                created: false,
            });
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let record = VideoRecord {
            id: *next_id,
            video_id: fields.video_id.clone(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            published: fields.published,
            channel_title: fields.channel_title.clone(),
            channel_id: fields.channel_id.clone(),
            playlist_id: fields.playlist_id.clone(),
            playlist_position: fields.playlist_position,
            thumbnail_url: fields.thumbnail_url.clone(),
            thumbnail_id: None,
            created_at: now,
            updated_at: now,
        };
        videos.insert(record.video_id.clone(), record.clone());
        Ok(Upserted {
            video: record,
            created: true,
        })
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool, FeedError> {
        Ok(self.videos.lock().unwrap().remove(video_id).is_some())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, FeedError> {
        let mut videos: Vec<VideoRecord> = self.videos.lock().unwrap().values().cloned().collect();
        videos.sort_by(|a, b| b.published.cmp(&a.published).then(b.id.cmp(&a.id)));
        Ok(videos)
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    config: Mutex<SiteYouTubeConfig>,
}

impl MemorySettingsStore {
    pub fn new(config: SiteYouTubeConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    pub fn snapshot(&self) -> SiteYouTubeConfig {
        self.config.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<SiteYouTubeConfig, FeedError> {
        Ok(self.snapshot())
    }

    async fn save(&self, config: &SiteYouTubeConfig) -> Result<(), FeedError> {
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }

    async fn store_token(&self, token: Option<&StoredToken>) -> Result<(), FeedError> {
        self.config.lock().unwrap().token = token.cloned();
        Ok(())
    }

    async fn mark_synced(&self, at: DateTime<Utc>) -> Result<(), FeedError> {
        self.config.lock().unwrap().last_saved = Some(at);
        Ok(())
    }
}
