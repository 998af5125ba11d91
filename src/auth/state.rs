//! Auth-state listeners and their subscription handles

use std::sync::{Arc, Mutex, Weak};

use super::types::User;
use crate::sync::lock;

/// Callback invoked with the current user, or `None` when signed out
pub type AuthListener = Box<dyn Fn(Option<&User>) + Send + Sync>;

type SharedListener = Arc<dyn Fn(Option<&User>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, SharedListener)>,
}

/// Registry of auth-state listeners
///
/// Listeners are invoked outside the registry lock, so a callback may itself
/// subscribe or drop a [`Subscription`].
#[derive(Clone, Default)]
pub struct AuthStateNotifier {
    listeners: Arc<Mutex<Listeners>>,
}

impl AuthStateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` and call it once with `current`
    pub fn subscribe(&self, listener: AuthListener, current: Option<&User>) -> Subscription {
        let listener: SharedListener = Arc::from(listener);
        let id = {
            let mut listeners = lock(&self.listeners);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener.clone()));
            id
        };

        listener(current);

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver a state change to every registered listener
    pub fn notify(&self, user: Option<&User>) {
        let snapshot: Vec<SharedListener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        for listener in snapshot {
            listener(user);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

/// Handle to a registered auth-state listener
///
/// The listener stays registered until the handle is dropped or
/// [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => lock(&listeners).entries.iter().any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(uid: &str) -> User {
        User {
            uid: uid.to_string(),
            email: None,
            display_name: None,
        }
    }

    #[test]
    fn subscribe_fires_immediately_and_on_change() {
        let notifier = AuthStateNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let _sub = notifier.subscribe(
            Box::new(move |_: Option<&User>| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        notifier.notify(Some(&user("u1")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_releases_listener() {
        let notifier = AuthStateNotifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let sub = notifier.subscribe(
            Box::new(move |_: Option<&User>| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        );
        assert!(sub.is_active());
        assert_eq!(notifier.listener_count(), 1);

        sub.unsubscribe();
        assert_eq!(notifier.listener_count(), 0);

        notifier.notify(None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
