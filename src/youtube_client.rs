// YouTube Data API v3 client for reading the authenticated channel's uploads
// Docs: https://developers.google.com/youtube/v3

use reqwest::{Client, Response};
use serde_json::json;

use crate::config::{
    AppConfig, DEFAULT_GOOGLE_AUTH_URL, DEFAULT_GOOGLE_TOKEN_URL, DEFAULT_YOUTUBE_API_BASE_URL,
};
use crate::error::FeedError;
use crate::models::youtube::{ChannelListResponse, GoogleTokenResponse, PlaylistItemListResponse};

/// Read/write access to the account's YouTube data
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    api_base_url: String,
    auth_url: String,
    token_url: String,
}

impl Default for YouTubeClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_YOUTUBE_API_BASE_URL,
            DEFAULT_GOOGLE_AUTH_URL,
            DEFAULT_GOOGLE_TOKEN_URL,
        )
    }
}

impl YouTubeClient {
    pub fn new(api_base_url: &str, auth_url: &str, token_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.to_string(),
            token_url: token_url.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.youtube_api_base_url,
            &config.google_auth_url,
            &config.google_token_url,
        )
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    /// Build the Google OAuth authorization URL.
    ///
    /// `access_type=offline` with `prompt=consent` makes Google issue a refresh token on every
    /// grant, not only on the first one.
    pub fn build_authorization_url(&self, client_id: &str, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            self.auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(YOUTUBE_SCOPE),
            urlencoding::encode(state)
        )
    }

    /// Exchange authorization code for access token
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<GoogleTokenResponse, FeedError> {
        let params = json!({
            "code": code,
            "client_id": client_id,
            "client_secret": client_secret,
            "redirect_uri": redirect_uri,
            "grant_type": "authorization_code"
        });

        let response = self.client.post(&self.token_url).json(&params).send().await?;
        if !response.status().is_success() {
            return Err(provider_error("Failed to exchange code", response).await);
        }

        Ok(response.json().await?)
    }

    /// Refresh an expired access token using refresh token
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<GoogleTokenResponse, FeedError> {
        let params = json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "refresh_token": refresh_token,
            "grant_type": "refresh_token"
        });

        let response = self.client.post(&self.token_url).json(&params).send().await?;
        if !response.status().is_success() {
            return Err(provider_error("Failed to refresh token", response).await);
        }

        Ok(response.json().await?)
    }

    // ========================================================================
    // Data API
    // ========================================================================

    /// channels.list for the authenticated account, with the related playlists
    pub async fn list_my_channels(&self, access_token: &str) -> Result<ChannelListResponse, FeedError> {
        let response = self
            .client
            .get(format!("{}/channels", self.api_base_url))
            .query(&[("part", "contentDetails"), ("mine", "true")])
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("Failed to list YouTube channels", response).await);
        }

        Ok(response.json().await?)
    }

    /// playlistItems.list with snippet and privacy status
    pub async fn list_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<PlaylistItemListResponse, FeedError> {
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/playlistItems", self.api_base_url))
            .query(&[
                ("part", "snippet,status"),
                ("playlistId", playlist_id),
                ("maxResults", max_results.as_str()),
            ])
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("Failed to list playlist items", response).await);
        }

        Ok(response.json().await?)
    }
}

async fn provider_error(context: &str, response: Response) -> FeedError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    FeedError::Provider(format!("{} ({}): {}", context, status, body))
}
