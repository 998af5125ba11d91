//! In-memory gateway for tests and offline demos.
//!
//! Implements the three gateway traits with the same observable behaviour as the
//! Firebase clients, plus hooks to make individual operations fail.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::auth::{AuthListener, AuthStateNotifier, Subscription, User};
use crate::error::Error;
use crate::firestore::{Document, FieldValue, Fields, Query};
use crate::gateway::{AuthService, DocumentStore, Gateway, ObjectStorage};
use crate::storage::StorageRef;
use crate::sync::lock;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    token: String,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    current: Option<User>,
    collections: HashMap<String, BTreeMap<String, Fields>>,
    objects: BTreeMap<String, StoredObject>,
    failing_deletes: HashSet<String>,
    fail_uploads: bool,
    fail_writes: bool,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Commit time, strictly increasing across writes
    fn commit_time(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::milliseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }
}

/// In-memory ObjectStorage, DocumentStore and AuthService
#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
    notifier: AuthStateNotifier,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as a [`Gateway`]
    pub fn gateway(&self) -> Gateway {
        Gateway::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    /// Insert a document with a chosen id, bypassing write failures
    pub fn insert_doc(&self, collection: &str, id: &str, fields: Fields) {
        let mut state = lock(&self.state);
        let fields = resolve_server_timestamps(fields, &mut state);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Snapshot of every document in a collection, ordered by id
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        lock(&self.state)
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Store an object directly
    pub fn put_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) {
        lock(&self.state).objects.insert(
            StorageRef::new(path).full_path().to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                token: Uuid::new_v4().to_string(),
            },
        );
    }

    pub fn object_exists(&self, path: &str) -> bool {
        lock(&self.state)
            .objects
            .contains_key(StorageRef::new(path).full_path())
    }

    pub fn object_bytes(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.state)
            .objects
            .get(StorageRef::new(path).full_path())
            .map(|o| o.bytes.clone())
    }

    pub fn object_count(&self) -> usize {
        lock(&self.state).objects.len()
    }

    /// Make deletes of `path` fail until cleared
    pub fn fail_deletes_of(&self, path: &str) {
        lock(&self.state)
            .failing_deletes
            .insert(StorageRef::new(path).full_path().to_string());
    }

    /// Make every upload fail
    pub fn fail_uploads(&self, fail: bool) {
        lock(&self.state).fail_uploads = fail;
    }

    /// Make every document write (add / delete) fail
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }

    /// Register an account without signing it in
    pub fn create_account(&self, email: &str, password: &str, display_name: Option<&str>) -> User {
        let user = User {
            uid: Uuid::new_v4().simple().to_string(),
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
        };
        lock(&self.state).accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Number of registered auth-state listeners
    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    fn set_current(&self, user: Option<User>) {
        lock(&self.state).current = user.clone();
        self.notifier.notify(user.as_ref());
    }
}

fn resolve_server_timestamps(fields: Fields, state: &mut MemoryState) -> Fields {
    fields
        .into_iter()
        .map(|(k, v)| match v {
            FieldValue::ServerTimestamp => (k, FieldValue::Timestamp(state.commit_time())),
            other => (k, other),
        })
        .collect()
}

#[async_trait]
impl AuthService for MemoryGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, Error> {
        if lock(&self.state).accounts.contains_key(email) {
            return Err(Error::auth("EMAIL_EXISTS"));
        }
        if password.len() < 6 {
            return Err(Error::auth("WEAK_PASSWORD"));
        }
        let user = self.create_account(email, password, None);
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = {
            let state = lock(&self.state);
            match state.accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(Error::auth("INVALID_LOGIN_CREDENTIALS")),
            }
        };
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    async fn update_profile(&self, display_name: &str) -> Result<User, Error> {
        let mut state = lock(&self.state);
        let mut user = state.current.clone().ok_or(Error::NotSignedIn)?;
        user.display_name = Some(display_name.to_string());

        if let Some(email) = &user.email {
            if let Some(account) = state.accounts.get_mut(email) {
                account.user = user.clone();
            }
        }
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.set_current(None);
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        lock(&self.state).current.clone()
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let current = self.current_user();
        self.notifier.subscribe(listener, current.as_ref())
    }
}

#[async_trait]
impl DocumentStore for MemoryGateway {
    async fn get_docs(&self, query: &Query) -> Result<Vec<Document>, Error> {
        Ok(query.apply(self.documents(query.collection())))
    }

    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        Ok(lock(&self.state)
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn add_doc(&self, collection: &str, fields: Fields) -> Result<String, Error> {
        let mut state = lock(&self.state);
        if state.fail_writes {
            return Err(Error::database("PERMISSION_DENIED (403)"));
        }
        if fields
            .values()
            .any(|v| v.as_array().is_some_and(|a| a.contains(&FieldValue::ServerTimestamp)))
        {
            return Err(Error::database(
                "server timestamps are only allowed as top-level fields",
            ));
        }

        let id = Uuid::new_v4().simple().to_string();
        let fields = resolve_server_timestamps(fields, &mut state);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), Error> {
        let mut state = lock(&self.state);
        if state.fail_writes {
            return Err(Error::database("PERMISSION_DENIED (403)"));
        }
        // Deleting a missing document succeeds, as on the platform.
        if let Some(docs) = state.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MemoryGateway {
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StorageRef, Error> {
        let reference = StorageRef::new(path);
        if lock(&self.state).fail_uploads {
            return Err(Error::storage("upload rejected (403)"));
        }
        self.put_object(reference.full_path(), bytes, content_type);
        Ok(reference)
    }

    async fn get_download_url(&self, reference: &StorageRef) -> Result<String, Error> {
        let state = lock(&self.state);
        let object = state
            .objects
            .get(reference.full_path())
            .ok_or_else(|| Error::storage(format!("object not found: {}", reference.full_path())))?;

        Ok(format!(
            "memory://objects/{}?alt=media&token={}",
            reference.encoded_path(),
            object.token
        ))
    }

    async fn delete_object(&self, reference: &StorageRef) -> Result<(), Error> {
        let mut state = lock(&self.state);
        if state.failing_deletes.contains(reference.full_path()) {
            return Err(Error::storage("delete rejected (403)"));
        }
        state
            .objects
            .remove(reference.full_path())
            .map(|_| ())
            .ok_or_else(|| Error::storage(format!("object not found: {}", reference.full_path())))
    }
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}
