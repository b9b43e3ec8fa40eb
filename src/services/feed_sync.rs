// Sync orchestrator: due-ness check, uploads fetch, last-sync bookkeeping
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::FeedError;
use crate::models::settings::SiteYouTubeConfig;
use crate::models::video::VideoRecord;
use crate::models::youtube::StoredToken;
use crate::services::reconcile::{reconcile_item, VideoCreatedListener};
use crate::services::token_manager::TokenManager;
use crate::store::{SettingsStore, VideoStore};
use crate::youtube_client::YouTubeClient;

pub const DEFAULT_UPLOAD_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Auto-update is off or the interval has not elapsed
    Skipped,
    Ran {
        synced: usize,
        last_saved: DateTime<Utc>,
    },
}

/// True when `force` is set, or auto-update is on and either no sync happened yet or the
/// configured interval has elapsed since the last one.
pub fn is_update_due(config: &SiteYouTubeConfig, force: bool, now: DateTime<Utc>) -> bool {
    if force {
        return true;
    }
    if !config.auto_update {
        return false;
    }
    match config.last_saved {
        None => true,
        Some(last_saved) => last_saved
            .checked_add_signed(config.update_interval())
            .map_or(false, |next_run| next_run <= now),
    }
}

#[derive(Clone)]
pub struct FeedSync {
    youtube: YouTubeClient,
    tokens: TokenManager,
    videos: Arc<dyn VideoStore>,
    settings: Arc<dyn SettingsStore>,
    listeners: Vec<Arc<dyn VideoCreatedListener>>,
    limit: u32,
}

impl FeedSync {
    pub fn new(
        youtube: YouTubeClient,
        tokens: TokenManager,
        videos: Arc<dyn VideoStore>,
        settings: Arc<dyn SettingsStore>,
        listeners: Vec<Arc<dyn VideoCreatedListener>>,
    ) -> Self {
        Self {
            youtube,
            tokens,
            videos,
            settings,
            listeners,
            limit: DEFAULT_UPLOAD_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Checks if it's time to sync, or syncs anyway when `force` is set.
    ///
    /// Once a run starts, `last_saved` is stamped even when nothing was fetched or the fetch
    /// failed, so a broken connection is retried once per interval at most.
    pub async fn run_auto_update(&self, force: bool) -> Result<SyncOutcome, FeedError> {
        let config = self.settings.load().await?;
        if !is_update_due(&config, force, Utc::now()) {
            tracing::debug!("YouTube auto-update not due");
            return Ok(SyncOutcome::Skipped);
        }

        tracing::info!(force, "Running YouTube auto-update");
        let fetched = self.fetch_recent_uploads(self.limit).await;

        let last_saved = Utc::now();
        self.settings.mark_synced(last_saved).await?;

        let synced = match fetched {
            Ok(uploads) => uploads.len(),
            Err(FeedError::NotAuthenticated) => {
                tracing::warn!("YouTube auto-update skipped: account is not authenticated");
                0
            }
            Err(e) => return Err(e),
        };

        tracing::info!(synced, "YouTube auto-update finished");
        Ok(SyncOutcome::Ran { synced, last_saved })
    }

    /// Reconciles up to `limit` recent uploads of the authenticated channel and returns the
    /// stored records. Provider errors are logged and yield a partial list. The (possibly
    /// refreshed) token is written back on every exit once a fetch started.
    pub async fn fetch_recent_uploads(&self, limit: u32) -> Result<Vec<VideoRecord>, FeedError> {
        let config = self.settings.load().await?;
        let mut token = TokenManager::valid_credential(&config)
            .cloned()
            .ok_or(FeedError::NotAuthenticated)?;

        let mut uploads = Vec::new();
        let result = self
            .collect_uploads(&config, &mut token, limit, &mut uploads)
            .await;

        self.settings.store_token(Some(&token)).await?;

        match result {
            Ok(()) => Ok(uploads),
            Err(e) if e.is_provider() => {
                tracing::error!("A YouTube service error occurred: {}", e);
                Ok(uploads)
            }
            Err(e) => Err(e),
        }
    }

    async fn collect_uploads(
        &self,
        config: &SiteYouTubeConfig,
        token: &mut StoredToken,
        limit: u32,
        uploads: &mut Vec<VideoRecord>,
    ) -> Result<(), FeedError> {
        *token = self.tokens.ensure_fresh(config, token.clone()).await?;

        let channels = self.youtube.list_my_channels(&token.access_token).await?;
        for channel in &channels.items {
            let Some(playlist_id) = channel.uploads_playlist_id() else {
                tracing::warn!(channel_id = %channel.id, "Channel has no uploads playlist");
                continue;
            };

            let items = match self
                .youtube
                .list_playlist_items(&token.access_token, playlist_id, limit)
                .await
            {
                Ok(response) => response.items,
                Err(e) if e.is_provider() => {
                    tracing::error!(channel_id = %channel.id, "Failed to list uploads: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            for item in &items {
                match reconcile_item(self.videos.as_ref(), &self.listeners, item).await {
                    Ok(Some(video)) => uploads.push(video),
                    Ok(None) => {}
                    Err(e) if e.is_provider() => {
                        tracing::error!(video_id = %item.video_id(), "Skipping playlist item: {}", e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::UpdateIntervalUnit;
    use crate::store::memory::{MemorySettingsStore, MemoryVideoStore};
    use chrono::Duration;
    use mockito::{Matcher, Server};

    const CHANNELS: &str = r#"{
        "items": [ { "id": "UC123", "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } } } ]
    }"#;

    const PLAYLIST_ITEMS: &str = r#"{
        "items": [
            {
                "snippet": {
                    "publishedAt": "2024-03-02T09:00:00Z",
                    "channelId": "UC123",
                    "title": "Newest upload",
                    "description": "Fresh",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/new/default.jpg" },
                        "maxres": { "url": "https://i.ytimg.com/vi/new/maxresdefault.jpg" }
                    },
                    "channelTitle": "Example Channel",
                    "playlistId": "UU123",
                    "position": 0,
                    "resourceId": { "kind": "youtube#video", "videoId": "new" }
                },
                "status": { "privacyStatus": "public" }
            },
            {
                "snippet": {
                    "publishedAt": "2024-03-01T09:00:00Z",
                    "channelId": "UC123",
                    "title": "Made private",
                    "playlistId": "UU123",
                    "position": 1,
                    "resourceId": { "kind": "youtube#video", "videoId": "hidden" }
                },
                "status": { "privacyStatus": "private" }
            }
        ]
    }"#;

    fn token(expires_in_minutes: i64) -> StoredToken {
        StoredToken {
            access_token: "ya29.current".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: Some(Utc::now() + Duration::minutes(expires_in_minutes)),
            token_type: "Bearer".to_string(),
            scope: None,
        }
    }

    fn connected_config() -> SiteYouTubeConfig {
        SiteYouTubeConfig {
            app_id: Some("client-id".to_string()),
            app_secret: Some("client-secret".to_string()),
            token: Some(token(60)),
            auto_update: true,
            ..SiteYouTubeConfig::default()
        }
    }

    struct Harness {
        feed: FeedSync,
        videos: Arc<MemoryVideoStore>,
        settings: Arc<MemorySettingsStore>,
    }

    fn harness(server: &Server, config: SiteYouTubeConfig) -> Harness {
        let url = server.url();
        let youtube = YouTubeClient::new(
            &format!("{}/youtube/v3", url),
            &format!("{}/o/oauth2/v2/auth", url),
            &format!("{}/token", url),
        );
        let tokens = TokenManager::new(youtube.clone(), "https://example.com/youtube/authenticate".to_string());
        let videos = Arc::new(MemoryVideoStore::new());
        let settings = Arc::new(MemorySettingsStore::new(config));
        let feed = FeedSync::new(youtube, tokens, videos.clone(), settings.clone(), Vec::new());

        Harness {
            feed,
            videos,
            settings,
        }
    }

    async fn mock_channels(server: &mut Server, access_token: &str) -> mockito::Mock {
        server
            .mock("GET", "/youtube/v3/channels")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("part".into(), "contentDetails".into()),
                Matcher::UrlEncoded("mine".into(), "true".into()),
            ]))
            .match_header("authorization", format!("Bearer {}", access_token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CHANNELS)
            .create_async()
            .await
    }

    async fn mock_playlist_items(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", "/youtube/v3/playlistItems")
            .match_query(Matcher::UrlEncoded("playlistId".into(), "UU123".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PLAYLIST_ITEMS)
            .create_async()
            .await
    }

    #[test]
    fn update_due_respects_interval() {
        let now = Utc::now();
        let mut config = SiteYouTubeConfig {
            auto_update: true,
            update_interval: 6,
            update_interval_unit: UpdateIntervalUnit::Hours,
            last_saved: Some(now - Duration::hours(5) - Duration::minutes(59)),
            ..SiteYouTubeConfig::default()
        };
        assert!(!is_update_due(&config, false, now));

        config.last_saved = Some(now - Duration::hours(6));
        assert!(is_update_due(&config, false, now));

        config.last_saved = Some(now - Duration::days(2));
        assert!(is_update_due(&config, false, now));
    }

    #[test]
    fn out_of_range_interval_is_never_due() {
        let now = Utc::now();
        let config = SiteYouTubeConfig {
            auto_update: true,
            update_interval: i32::MAX,
            update_interval_unit: UpdateIntervalUnit::Days,
            last_saved: Some(now),
            ..SiteYouTubeConfig::default()
        };
        assert!(!is_update_due(&config, false, now));
        assert!(is_update_due(&config, true, now));
    }

    #[test]
    fn update_due_on_fresh_install_only_when_enabled() {
        let now = Utc::now();
        let mut config = SiteYouTubeConfig::default();
        assert!(!is_update_due(&config, false, now));

        config.auto_update = true;
        assert!(is_update_due(&config, false, now));
    }

    #[test]
    fn force_ignores_flag_and_interval() {
        let now = Utc::now();
        let config = SiteYouTubeConfig {
            auto_update: false,
            last_saved: Some(now),
            update_interval: 30,
            update_interval_unit: UpdateIntervalUnit::Days,
            ..SiteYouTubeConfig::default()
        };
        assert!(is_update_due(&config, true, now));
    }

    #[tokio::test]
    async fn fresh_install_syncs_uploads_and_stamps_last_saved() {
        let mut server = Server::new_async().await;
        let channels = mock_channels(&mut server, "ya29.current").await;
        let items = mock_playlist_items(&mut server).await;
        let h = harness(&server, connected_config());

        // A previously public video that has since been made private
        h.videos
            .upsert(&crate::models::video::VideoFields {
                video_id: "hidden".to_string(),
                title: "Made private".to_string(),
                description: String::new(),
                published: Utc::now(),
                channel_title: String::new(),
                channel_id: String::new(),
                playlist_id: "UU123".to_string(),
                playlist_position: 1,
                thumbnail_url: None,
            })
            .await
            .unwrap();

        let before = Utc::now();
        let outcome = h.feed.run_auto_update(false).await.unwrap();

        channels.assert_async().await;
        items.assert_async().await;
        match outcome {
            SyncOutcome::Ran { synced, last_saved } => {
                assert_eq!(synced, 1);
                assert!(last_saved >= before);
            }
            SyncOutcome::Skipped => panic!("expected a sync run"),
        }

        let stored = h.videos.find_by_video_id("new").await.unwrap().unwrap();
        assert_eq!(stored.title, "Newest upload");
        assert_eq!(
            stored.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/new/maxresdefault.jpg")
        );
        assert!(h.videos.find_by_video_id("hidden").await.unwrap().is_none());

        let config = h.settings.snapshot();
        assert!(config.last_saved.unwrap() >= before);
        assert!(config.token.is_some());
    }

    #[tokio::test]
    async fn provider_failure_still_stamps_last_saved() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/youtube/v3/channels")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("backend error")
            .create_async()
            .await;
        let h = harness(&server, connected_config());

        let outcome = h.feed.run_auto_update(false).await.unwrap();

        assert!(matches!(outcome, SyncOutcome::Ran { synced: 0, .. }));
        assert!(h.settings.snapshot().last_saved.is_some());
        assert_eq!(h.videos.len(), 0);
    }

    #[tokio::test]
    async fn not_due_makes_no_requests() {
        let mut server = Server::new_async().await;
        let channels = server
            .mock("GET", "/youtube/v3/channels")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let last_saved = Utc::now() - Duration::hours(1);
        let h = harness(
            &server,
            SiteYouTubeConfig {
                last_saved: Some(last_saved),
                ..connected_config()
            },
        );

        let outcome = h.feed.run_auto_update(false).await.unwrap();

        channels.assert_async().await;
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(h.settings.snapshot().last_saved, Some(last_saved));
    }

    #[tokio::test]
    async fn forced_run_without_token_still_stamps_last_saved() {
        let server = Server::new_async().await;
        let h = harness(
            &server,
            SiteYouTubeConfig {
                token: None,
                auto_update: false,
                ..connected_config()
            },
        );

        let err = h.feed.fetch_recent_uploads(50).await.unwrap_err();
        assert!(matches!(err, FeedError::NotAuthenticated));

        let outcome = h.feed.run_auto_update(true).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Ran { synced: 0, .. }));
        assert!(h.settings.snapshot().last_saved.is_some());
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed_and_persisted() {
        let mut server = Server::new_async().await;
        let refresh = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.refreshed","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;
        let channels = mock_channels(&mut server, "ya29.refreshed").await;
        mock_playlist_items(&mut server).await;
        let h = harness(
            &server,
            SiteYouTubeConfig {
                token: Some(token(1)),
                ..connected_config()
            },
        );

        let uploads = h.feed.fetch_recent_uploads(50).await.unwrap();

        refresh.assert_async().await;
        channels.assert_async().await;
        assert_eq!(uploads.len(), 1);
        let stored = h.settings.snapshot().token.unwrap();
        assert_eq!(stored.access_token, "ya29.refreshed");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
    }
}
