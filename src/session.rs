//! Application-wide session state
//!
//! [`SessionContext`] subscribes once to the auth-state stream and republishes
//! it through a `watch` channel. It owns the [`Subscription`], so the listener
//! is released when the context is closed or dropped.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::auth::{Subscription, User};
use crate::gateway::AuthService;
use crate::model::UserProfile;
use crate::sync::lock;

/// Snapshot of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    /// True until the first auth-state notification arrives
    pub loading_auth: bool,
}

impl SessionState {
    pub fn signed(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            loading_auth: true,
        }
    }
}

pub struct SessionContext {
    sender: Arc<watch::Sender<SessionState>>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionContext {
    /// Subscribe to `auth` for the lifetime of the returned context
    pub fn start(auth: &dyn AuthService) -> Self {
        let (sender, _) = watch::channel(SessionState::default());
        let sender = Arc::new(sender);

        let publisher = sender.clone();
        let subscription = auth.on_auth_state_changed(Box::new(move |user: Option<&User>| {
            let user = user.map(UserProfile::from);
            log::debug!(
                "Auth state changed: {}",
                user.as_ref().map(|u| u.uid.as_str()).unwrap_or("signed out")
            );
            publisher.send_replace(SessionState {
                user,
                loading_auth: false,
            });
        }));

        Self {
            sender,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    pub fn signed(&self) -> bool {
        self.sender.borrow().signed()
    }

    pub fn loading_auth(&self) -> bool {
        self.sender.borrow().loading_auth
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.sender.borrow().user.clone()
    }

    /// Receiver that observes every later state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    /// Set the user right away, without waiting for the auth service
    pub fn handle_info_user(&self, user: UserProfile) {
        self.sender.send_modify(|state| state.user = Some(user));
    }

    /// Release the auth-state subscription
    ///
    /// The last published state stays readable.
    pub fn close(&self) {
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.unsubscribe();
        }
    }

    /// Whether the auth-state subscription is still held
    pub fn is_listening(&self) -> bool {
        lock(&self.subscription)
            .as_ref()
            .is_some_and(Subscription::is_active)
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGateway;

    #[tokio::test]
    async fn starts_signed_out_once_notified() {
        let memory = MemoryGateway::new();
        let session = SessionContext::start(&memory);

        let state = session.state();
        assert!(!state.loading_auth);
        assert!(!state.signed());
    }

    #[tokio::test]
    async fn follows_sign_in_and_sign_out() {
        let memory = MemoryGateway::new();
        memory.create_account("ana@test.com", "secret1", Some("Ana"));
        let session = SessionContext::start(&memory);
        let mut changes = session.subscribe();

        memory.sign_in("ana@test.com", "secret1").await.unwrap();
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();
        assert!(session.signed());
        assert_eq!(session.user().unwrap().name.as_deref(), Some("Ana"));

        memory.sign_out().await.unwrap();
        assert!(!session.signed());
    }

    #[tokio::test]
    async fn handle_info_user_overrides_state() {
        let memory = MemoryGateway::new();
        let session = SessionContext::start(&memory);

        session.handle_info_user(UserProfile {
            uid: "u1".into(),
            name: Some("Bia".into()),
            email: Some("bia@test.com".into()),
        });
        assert!(session.signed());
        assert_eq!(session.user().unwrap().uid, "u1");
    }

    #[tokio::test]
    async fn close_releases_subscription() {
        let memory = MemoryGateway::new();
        memory.create_account("ana@test.com", "secret1", None);
        let session = SessionContext::start(&memory);
        assert!(session.is_listening());

        session.close();
        assert!(!session.is_listening());

        memory.sign_in("ana@test.com", "secret1").await.unwrap();
        assert!(!session.signed());
    }

    #[tokio::test]
    async fn drop_releases_listener() {
        let memory = MemoryGateway::new();
        let session = SessionContext::start(&memory);
        drop(session);

        // a fresh subscriber is the only listener left
        let probe = SessionContext::start(&memory);
        assert!(probe.is_listening());
        assert_eq!(memory.listener_count(), 1);
    }
}
