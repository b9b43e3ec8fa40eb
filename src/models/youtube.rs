// YouTube Data API v3 and Google OAuth wire types
// Docs: https://developers.google.com/youtube/v3/docs/playlistItems

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// channels.list (part=contentDetails, mine=true)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    #[serde(rename = "contentDetails")]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

impl ChannelItem {
    pub fn uploads_playlist_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|details| details.related_playlists.uploads.as_deref())
    }
}

// ============================================================================
// playlistItems.list (part=snippet,status)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
    pub status: Option<PlaylistItemStatus>,
}

impl PlaylistItem {
    pub fn video_id(&self) -> &str {
        &self.snippet.resource_id.video_id
    }

    pub fn is_public(&self) -> bool {
        self.status
            .as_ref()
            .map(|status| status.privacy_status == "public")
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    /// Only needed for public items; removals go by `resource_id` alone
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub playlist_id: String,
    #[serde(default)]
    pub position: i32,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<ThumbnailInfo>,
    pub medium: Option<ThumbnailInfo>,
    pub high: Option<ThumbnailInfo>,
    pub standard: Option<ThumbnailInfo>,
    pub maxres: Option<ThumbnailInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailInfo {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemStatus {
    #[serde(rename = "privacyStatus")]
    pub privacy_status: String, // "public", "private", "unlisted"
}

// ============================================================================
// OAuth tokens
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl GoogleTokenResponse {
    /// Refresh responses usually omit the refresh token; keep the one we already had
    pub fn into_stored(self, issued_at: DateTime<Utc>, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: self.expires_in.map(|secs| issued_at + Duration::seconds(secs)),
            token_type: self.token_type,
            scope: self.scope,
        }
    }
}

/// The credential blob persisted in the site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    pub scope: Option<String>,
}

impl StoredToken {
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// True when the access token is expired or will be within `leeway`
    pub fn expires_within(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now + leeway,
            None => false,
        }
    }
}
