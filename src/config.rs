// src/config.rs
use std::env;

use crate::error::FeedError;

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Path of the OAuth callback, relative to the site base URL
pub const CALLBACK_PATH: &str = "youtube/authenticate";
/// Where the callback sends the admin once the token is stored
pub const ADMIN_SETTINGS_PATH: &str = "admin/settings";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    /// Always ends with a `/`
    pub site_base_url: String,
    pub jwt_secret: String,
    pub sync_limit: u32,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub youtube_api_base_url: String,
}

impl AppConfig {
    /// Reads configuration from the environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, FeedError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| FeedError::Config("DATABASE_URL must be set".to_string()))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| FeedError::Config("JWT_SECRET must be set".to_string()))?;

        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;
        let sync_limit = parse_var("YOUTUBE_SYNC_LIMIT", 50)?;

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            site_base_url: normalize_base_url(
                &env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/".to_string()),
            ),
            jwt_secret,
            sync_limit,
            google_auth_url: env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_AUTH_URL.to_string()),
            google_token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
            youtube_api_base_url: env::var("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YOUTUBE_API_BASE_URL.to_string()),
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.site_base_url, CALLBACK_PATH)
    }

    pub fn admin_settings_url(&self) -> String {
        format!("{}{}", self.site_base_url, ADMIN_SETTINGS_PATH)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, FeedError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FeedError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    format!("{}/", trimmed)
}

#[cfg(test)]
impl AppConfig {
    /// Configuration pointing every Google endpoint at `server_url` (a mock server)
    pub fn for_tests(server_url: &str) -> Self {
        Self {
            database_url: "postgres://localhost/youtube_feed_test".to_string(),
            database_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_string(),
            site_base_url: "https://example.com/".to_string(),
            jwt_secret: "test-secret".to_string(),
            sync_limit: 50,
            google_auth_url: format!("{}/o/oauth2/v2/auth", server_url),
            google_token_url: format!("{}/token", server_url),
            youtube_api_base_url: format!("{}/youtube/v3", server_url),
        }
    }
}
