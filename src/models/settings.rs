use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::FeedError;
use crate::models::youtube::StoredToken;

/// Upper bound on the interval count whatever the unit (a year in minutes).
/// Mirrored by a CHECK constraint on `site_config`.
pub const MAX_UPDATE_INTERVAL: i32 = 525_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateIntervalUnit {
    Minutes,
    Hours,
    Days,
}

impl UpdateIntervalUnit {
    pub const ALL: [UpdateIntervalUnit; 3] = [
        UpdateIntervalUnit::Minutes,
        UpdateIntervalUnit::Hours,
        UpdateIntervalUnit::Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateIntervalUnit::Minutes => "Minutes",
            UpdateIntervalUnit::Hours => "Hours",
            UpdateIntervalUnit::Days => "Days",
        }
    }

    pub fn duration(&self, amount: i32) -> Duration {
        let amount = i64::from(amount);
        match self {
            UpdateIntervalUnit::Minutes => Duration::minutes(amount),
            UpdateIntervalUnit::Hours => Duration::hours(amount),
            UpdateIntervalUnit::Days => Duration::days(amount),
        }
    }
}

impl fmt::Display for UpdateIntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateIntervalUnit {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FeedError::Config(format!("unknown update interval unit: {}", s)))
    }
}

/// YouTube fields of the singleton site settings row
#[derive(Debug, Clone, PartialEq)]
pub struct SiteYouTubeConfig {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub token: Option<StoredToken>,
    pub last_saved: Option<DateTime<Utc>>,
    pub auto_update: bool,
    pub update_interval: i32,
    pub update_interval_unit: UpdateIntervalUnit,
}

impl Default for SiteYouTubeConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            token: None,
            last_saved: None,
            auto_update: false,
            update_interval: 6,
            update_interval_unit: UpdateIntervalUnit::Hours,
        }
    }
}

/// Partial update sent by the admin settings screen
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SettingsUpdate {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub auto_update: Option<bool>,
    pub update_interval: Option<i32>,
    pub update_interval_unit: Option<String>,
}

impl SiteYouTubeConfig {
    /// App ID and secret, both present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.app_id.as_deref(), self.app_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval_unit.duration(self.update_interval)
    }

    /// Applies an admin update. A changed app ID or secret clears the stored token,
    /// since a token issued to the old client is no longer valid.
    /// Returns whether the token was cleared.
    pub fn apply_update(&mut self, update: SettingsUpdate) -> Result<bool, FeedError> {
        if let Some(interval) = update.update_interval {
            if !(1..=MAX_UPDATE_INTERVAL).contains(&interval) {
                return Err(FeedError::Validation(format!(
                    "update_interval must be between 1 and {}",
                    MAX_UPDATE_INTERVAL
                )));
            }
        }
        let unit = match update.update_interval_unit.as_deref() {
            Some(raw) => Some(raw.parse::<UpdateIntervalUnit>().map_err(|_| {
                FeedError::Validation(format!(
                    "update_interval_unit must be one of Minutes, Hours, Days (got {})",
                    raw
                ))
            })?),
            None => None,
        };

        let mut credentials_changed = false;
        if let Some(app_id) = update.app_id {
            let app_id = non_empty(app_id);
            credentials_changed |= app_id != self.app_id;
            self.app_id = app_id;
        }
        if let Some(app_secret) = update.app_secret {
            let app_secret = non_empty(app_secret);
            credentials_changed |= app_secret != self.app_secret;
            self.app_secret = app_secret;
        }

        if let Some(auto_update) = update.auto_update {
            self.auto_update = auto_update;
        }
        if let Some(interval) = update.update_interval {
            self.update_interval = interval;
        }
        if let Some(unit) = unit {
            self.update_interval_unit = unit;
        }

        let token_cleared = credentials_changed && self.token.is_some();
        if credentials_changed {
            self.token = None;
        }
        Ok(token_cleared)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw `site_config` row; the unit and the token blob are parsed in `TryFrom`
#[derive(Debug, FromRow)]
pub struct SettingsRow {
    pub youtube_feed_app_id: Option<String>,
    pub youtube_feed_app_secret: Option<String>,
    pub youtube_feed_token: Option<String>,
    pub youtube_feed_last_saved: Option<DateTime<Utc>>,
    pub youtube_feed_auto_update: bool,
    pub youtube_feed_update_interval: i32,
    pub youtube_feed_update_interval_unit: String,
}

impl TryFrom<SettingsRow> for SiteYouTubeConfig {
    type Error = FeedError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let token = match row.youtube_feed_token.as_deref() {
            Some(blob) if !blob.is_empty() => match StoredToken::from_blob(blob) {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable YouTube token in site config: {}", e);
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            app_id: row.youtube_feed_app_id,
            app_secret: row.youtube_feed_app_secret,
            token,
            last_saved: row.youtube_feed_last_saved,
            auto_update: row.youtube_feed_auto_update,
            update_interval: row.youtube_feed_update_interval,
            update_interval_unit: row.youtube_feed_update_interval_unit.parse()?,
        })
    }
}

/// What the admin settings tab shows
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub app_id: Option<String>,
    pub has_app_secret: bool,
    pub connected: bool,
    pub auth_url: Option<String>,
    pub auto_update: bool,
    pub update_interval: i32,
    pub update_interval_unit: UpdateIntervalUnit,
    pub update_interval_units: Vec<UpdateIntervalUnit>,
    pub last_saved: Option<DateTime<Utc>>,
}
