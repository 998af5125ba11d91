//! Seams between the pages and the backend platform
//!
//! Every page talks to the platform through these three traits. The Firebase
//! REST clients and [`crate::memory::MemoryGateway`] both implement them.

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::{AuthListener, Subscription, User};
use crate::error::Error;
use crate::firestore::{Document, Fields, Query};
use crate::storage::StorageRef;

/// Authentication service
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, Error>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, Error>;

    /// Set the display name of the signed-in user
    ///
    /// Does not notify auth-state listeners.
    async fn update_profile(&self, display_name: &str) -> Result<User, Error>;

    /// Drop the current session
    async fn sign_out(&self) -> Result<(), Error>;

    fn current_user(&self) -> Option<User>;

    /// Register a listener, called once right away and on every sign-in / sign-out
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription;
}

/// Document collection store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_docs(&self, query: &Query) -> Result<Vec<Document>, Error>;

    /// Read one document; `Ok(None)` when it does not exist
    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Document>, Error>;

    /// Store a new document and return its generated id
    async fn add_doc(&self, collection: &str, fields: Fields) -> Result<String, Error>;

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), Error>;
}

/// Binary object storage
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StorageRef, Error>;

    /// Durable download address of a stored object
    async fn get_download_url(&self, reference: &StorageRef) -> Result<String, Error>;

    async fn delete_object(&self, reference: &StorageRef) -> Result<(), Error>;
}

/// The three platform services handed to the pages
#[derive(Clone)]
pub struct Gateway {
    pub auth: Arc<dyn AuthService>,
    pub db: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Gateway {
    pub fn new(
        auth: Arc<dyn AuthService>,
        db: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self { auth, db, storage }
    }
}
