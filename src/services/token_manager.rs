// OAuth token lifecycle: authorization URL, callback exchange, refresh
use chrono::{Duration, Utc};
use rand::Rng;

use crate::error::FeedError;
use crate::models::settings::SiteYouTubeConfig;
use crate::models::youtube::StoredToken;
use crate::services::session::SessionStore;
use crate::store::SettingsStore;
use crate::youtube_client::YouTubeClient;

/// Access tokens expiring sooner than this are refreshed before use
const REFRESH_LEEWAY_MINUTES: i64 = 5;

const STATE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct TokenManager {
    youtube: YouTubeClient,
    redirect_uri: String,
}

impl TokenManager {
    pub fn new(youtube: YouTubeClient, redirect_uri: String) -> Self {
        Self {
            youtube,
            redirect_uri,
        }
    }

    /// Random anti-forgery value for the `state` parameter
    pub fn generate_state() -> String {
        let mut rng = rand::thread_rng();
        (0..32)
            .map(|_| STATE_CHARS[rng.gen_range(0..STATE_CHARS.len())] as char)
            .collect()
    }

    /// Stores a fresh state in the caller's session and returns the URL the admin visits to
    /// grant access to the channel.
    pub fn build_authorization_url(
        &self,
        config: &SiteYouTubeConfig,
        sessions: &SessionStore,
        session_id: &str,
    ) -> Result<String, FeedError> {
        let (client_id, _) = config.credentials().ok_or(FeedError::NotConfigured)?;

        let state = Self::generate_state();
        sessions.put_state(session_id, &state);

        Ok(self
            .youtube
            .build_authorization_url(client_id, &self.redirect_uri, &state))
    }

    /// Completes the OAuth flow. The code is only exchanged when `state` is exactly the value
    /// stored in the session. On success the token is persisted and returned.
    pub async fn handle_callback(
        &self,
        settings: &dyn SettingsStore,
        code: Option<&str>,
        state: Option<&str>,
        session_state: Option<&str>,
    ) -> Result<StoredToken, FeedError> {
        let code = code.filter(|c| !c.is_empty()).ok_or(FeedError::MissingCode)?;

        match (session_state, state) {
            (Some(expected), Some(received)) if expected == received => {}
            _ => {
                tracing::warn!("OAuth callback rejected: state did not match the session");
                return Err(FeedError::InvalidState);
            }
        }

        let config = settings.load().await?;
        let (client_id, client_secret) = config.credentials().ok_or(FeedError::NotConfigured)?;

        let issued_at = Utc::now();
        let response = self
            .youtube
            .exchange_code_for_token(code, client_id, client_secret, &self.redirect_uri)
            .await?;
        let token = response.into_stored(issued_at, None);

        settings.store_token(Some(&token)).await?;
        tracing::info!("YouTube account connected");

        Ok(token)
    }

    /// The persisted token, or none. App credentials are checked first; without them the token
    /// is not looked at.
    pub fn valid_credential(config: &SiteYouTubeConfig) -> Option<&StoredToken> {
        config.credentials()?;
        config.token.as_ref()
    }

    /// A token is loaded, not necessarily unexpired
    pub fn is_authenticated(config: &SiteYouTubeConfig) -> bool {
        Self::valid_credential(config).is_some()
    }

    /// Refreshes the access token when it is about to expire and a refresh token exists
    pub async fn ensure_fresh(
        &self,
        config: &SiteYouTubeConfig,
        token: StoredToken,
    ) -> Result<StoredToken, FeedError> {
        let now = Utc::now();
        if !token.expires_within(now, Duration::minutes(REFRESH_LEEWAY_MINUTES)) {
            return Ok(token);
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            tracing::warn!("YouTube access token expired and no refresh token is stored");
            return Ok(token);
        };
        let (client_id, client_secret) = config.credentials().ok_or(FeedError::NotConfigured)?;

        tracing::info!("Refreshing expired YouTube access token");
        let response = self
            .youtube
            .refresh_access_token(&refresh_token, client_id, client_secret)
            .await?;

        Ok(response.into_stored(now, Some(refresh_token)))
    }
}
