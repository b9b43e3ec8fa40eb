use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{SettingsStore, Upserted, VideoStore};
use crate::error::FeedError;
use crate::models::settings::{SettingsRow, SiteYouTubeConfig};
use crate::models::video::{VideoFields, VideoRecord};
use crate::models::youtube::StoredToken;

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    video: VideoRecord,
    inserted: bool,
}

#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn find_by_video_id(&self, video_id: &str) -> Result<Option<VideoRecord>, FeedError> {
        let video = sqlx::query_as::<_, VideoRecord>(
            "SELECT * FROM youtube_videos WHERE video_id = $1 LIMIT 1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn upsert(&self, fields: &VideoFields) -> Result<Upserted, FeedError> {
        // xmax is 0 only for a row this statement inserted
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO youtube_videos (
                video_id, title, description, published, channel_title,
                channel_id, playlist_id, playlist_position, thumbnail_url,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            ON CONFLICT (video_id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                published = EXCLUDED.published,
                channel_title = EXCLUDED.channel_title,
                channel_id = EXCLUDED.channel_id,
                playlist_id = EXCLUDED.playlist_id,
                playlist_position = EXCLUDED.playlist_position,
                thumbnail_url = EXCLUDED.thumbnail_url,
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(&fields.video_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.published)
        .bind(&fields.channel_title)
        .bind(&fields.channel_id)
        .bind(&fields.playlist_id)
        .bind(fields.playlist_position)
        .bind(&fields.thumbnail_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(Upserted {
            video: row.video,
            created: row.inserted,
        })
    }

    async fn delete_by_video_id(&self, video_id: &str) -> Result<bool, FeedError> {
        let result = sqlx::query("DELETE FROM youtube_videos WHERE video_id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, FeedError> {
        let videos = sqlx::query_as::<_, VideoRecord>(
            "SELECT * FROM youtube_videos ORDER BY published DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }
}

#[derive(Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn token_blob(token: Option<&StoredToken>) -> Result<Option<String>, FeedError> {
    token
        .map(|token| token.to_blob())
        .transpose()
        .map_err(|e| FeedError::Config(format!("failed to serialize YouTube token: {}", e)))
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn load(&self) -> Result<SiteYouTubeConfig, FeedError> {
        // The migration seeds the singleton row; recreate it if someone removed it
        sqlx::query("INSERT INTO site_config (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT youtube_feed_app_id, youtube_feed_app_secret, youtube_feed_token,
                   youtube_feed_last_saved, youtube_feed_auto_update,
                   youtube_feed_update_interval, youtube_feed_update_interval_unit
            FROM site_config WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        SiteYouTubeConfig::try_from(row)
    }

    async fn save(&self, config: &SiteYouTubeConfig) -> Result<(), FeedError> {
        sqlx::query(
            r#"
            UPDATE site_config SET
                youtube_feed_app_id = $1,
                youtube_feed_app_secret = $2,
                youtube_feed_token = $3,
                youtube_feed_last_saved = $4,
                youtube_feed_auto_update = $5,
                youtube_feed_update_interval = $6,
                youtube_feed_update_interval_unit = $7,
                updated_at = NOW()
            WHERE id = 1
            "#,
        )
        .bind(&config.app_id)
        .bind(&config.app_secret)
        .bind(token_blob(config.token.as_ref())?)
        .bind(config.last_saved)
        .bind(config.auto_update)
        .bind(config.update_interval)
        .bind(config.update_interval_unit.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn store_token(&self, token: Option<&StoredToken>) -> Result<(), FeedError> {
        sqlx::query("UPDATE site_config SET youtube_feed_token = $1, updated_at = NOW() WHERE id = 1")
            .bind(token_blob(token)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_synced(&self, at: DateTime<Utc>) -> Result<(), FeedError> {
        sqlx::query(
            "UPDATE site_config SET youtube_feed_last_saved = $1, updated_at = NOW() WHERE id = 1",
        )
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
