// lib.rs - YouTube feed sync service
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod youtube_client;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::feed_sync::FeedSync;
use crate::services::reconcile::{LoggingListener, VideoCreatedListener};
use crate::services::session::SessionStore;
use crate::services::token_manager::TokenManager;
use crate::store::{SettingsStore, VideoStore};
use crate::youtube_client::YouTubeClient;

// AppState holds the stores, the OAuth token manager, the sync orchestrator and pending OAuth sessions
pub struct AppState {
    pub config: AppConfig,
    pub videos: Arc<dyn VideoStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub tokens: TokenManager,
    pub feed: FeedSync,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        videos: Arc<dyn VideoStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let youtube = YouTubeClient::from_config(&config);
        let tokens = TokenManager::new(youtube.clone(), config.redirect_uri());

        let listeners = vec![Arc::new(LoggingListener) as Arc<dyn VideoCreatedListener>];
        let feed = FeedSync::new(
            youtube,
            tokens.clone(),
            videos.clone(),
            settings.clone(),
            listeners,
        )
        .with_limit(config.sync_limit);

        Self {
            config,
            videos,
            settings,
            tokens,
            feed,
            sessions: SessionStore::new(),
        }
    }
}
