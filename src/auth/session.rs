//! Session management for authentication

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::User;
use crate::sync::{read, write};

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID token sent as bearer credential
    pub id_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The signed-in user
    pub user: User,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(id_token: String, refresh_token: String, user: User, expires_in: i64) -> Self {
        Self {
            id_token,
            refresh_token,
            user,
            expires_in,
            expires_at: Some(now_secs() + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs() >= expires_at,
            None => false,
        }
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

/// Parse the decimal-string lifetime the platform returns
pub(crate) fn parse_expires_in(value: &str) -> i64 {
    value.trim().parse().unwrap_or(3600)
}

/// Current session shared between the auth, database and storage clients
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Session> {
        read(&self.inner).clone()
    }

    pub fn set(&self, session: Session) {
        *write(&self.inner) = Some(session);
    }

    pub fn clear(&self) {
        *write(&self.inner) = None;
    }

    /// The bearer token of the current session
    pub fn id_token(&self) -> Option<String> {
        read(&self.inner).as_ref().map(|s| s.id_token.clone())
    }

    pub fn user(&self) -> Option<User> {
        read(&self.inner).as_ref().map(|s| s.user.clone())
    }

    /// Apply a change to the stored user, if any
    pub(crate) fn update_user(&self, f: impl FnOnce(&mut User)) {
        if let Some(session) = write(&self.inner).as_mut() {
            f(&mut session.user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            email: Some("a@b.com".to_string()),
            display_name: None,
        }
    }

    #[test]
    fn fresh_session_is_not_expired() {
        let session = Session::new("t".into(), "r".into(), user(), 3600);
        assert!(!session.is_expired());
    }

    #[test]
    fn zero_lifetime_session_is_expired() {
        let session = Session::new("t".into(), "r".into(), user(), 0);
        assert!(session.is_expired());
    }

    #[test]
    fn store_updates_user_in_place() {
        let store = SessionStore::new();
        store.set(Session::new("t".into(), "r".into(), user(), 3600));
        store.update_user(|u| u.display_name = Some("Ana".into()));

        assert_eq!(store.user().unwrap().display_name.as_deref(), Some("Ana"));
        assert_eq!(store.id_token().as_deref(), Some("t"));

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn expires_in_falls_back_to_one_hour() {
        assert_eq!(parse_expires_in("1800"), 1800);
        assert_eq!(parse_expires_in("soon"), 3600);
    }
}
