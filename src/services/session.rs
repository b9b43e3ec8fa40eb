// Pending OAuth state per browser session
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Cookie carrying the session ID between the admin screen and the OAuth callback
pub const SESSION_COOKIE: &str = "youtube_feed_session";

/// States older than this are dropped; the user has to restart the flow
const STATE_TTL_MINUTES: i64 = 60;

#[derive(Clone, Default)]
pub struct SessionStore {
    // session_id -> (oauth state, issued at)
    states: Arc<Mutex<HashMap<String, (String, DateTime<Utc>)>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any state already pending for this session
    pub fn put_state(&self, session_id: &str, state: &str) {
        let now = Utc::now();
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.retain(|_, (_, issued_at)| now - *issued_at <= Duration::minutes(STATE_TTL_MINUTES));
        states.insert(session_id.to_string(), (state.to_string(), now));
    }

    /// Removes and returns the pending state, if it has not expired
    pub fn take_state(&self, session_id: &str) -> Option<String> {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let (state, issued_at) = states.remove(session_id)?;
        if Utc::now() - issued_at > Duration::minutes(STATE_TTL_MINUTES) {
            return None;
        }
        Some(state)
    }
}
