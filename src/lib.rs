//! Web Carros client library
//!
//! A car classifieds client backed by Firebase: browse and search listings,
//! sign up or sign in, and manage your own listings with photos. The pages in
//! [`pages`] hold view state and run user actions against a [`Gateway`], either
//! the Firebase REST clients built by [`WebCarros`] or the in-memory
//! [`memory::MemoryGateway`].

pub mod app;
pub mod auth;
pub mod components;
pub mod config;
pub mod error;
pub mod fetch;
pub mod firestore;
pub mod form;
pub mod gateway;
pub mod memory;
pub mod model;
pub mod notify;
pub mod pages;
pub mod routes;
pub mod session;
pub mod storage;

pub(crate) mod sync;

use reqwest::Client;
use std::sync::Arc;

use crate::app::App;
use crate::auth::{FirebaseAuth, SessionStore, TokenProvider};
use crate::config::{ClientOptions, FirebaseConfig};
use crate::error::Error;
use crate::firestore::FirestoreClient;
use crate::gateway::Gateway;
use crate::storage::StorageClient;

/// Firebase-backed entry point
pub struct WebCarros {
    /// Project credentials
    pub config: FirebaseConfig,
    /// HTTP client shared by every service
    pub http_client: Client,
    /// Auth client for sign-up, sign-in and profile updates
    pub auth: Arc<FirebaseAuth>,
    /// Client options
    pub options: ClientOptions,
    firestore: Arc<FirestoreClient>,
    storage: Arc<StorageClient>,
}

impl WebCarros {
    /// Create a client for the project described by `config`
    ///
    /// # Example
    ///
    /// ```
    /// use webcarros::{config::FirebaseConfig, WebCarros};
    ///
    /// let config = FirebaseConfig::new("your-api-key", "your-project", "your-project.appspot.com");
    /// let client = WebCarros::new(config).unwrap();
    /// ```
    pub fn new(config: FirebaseConfig) -> Result<Self, Error> {
        Self::new_with_options(config, ClientOptions::default())
    }

    /// Create a client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use webcarros::{config::{ClientOptions, FirebaseConfig}, WebCarros};
    ///
    /// let options = ClientOptions::default().with_request_timeout(Some(Duration::from_secs(5)));
    /// let config = FirebaseConfig::new("your-api-key", "your-project", "your-project.appspot.com");
    /// let client = WebCarros::new_with_options(config, options).unwrap();
    /// ```
    pub fn new_with_options(config: FirebaseConfig, options: ClientOptions) -> Result<Self, Error> {
        let http_client = Client::builder().build()?;
        let tokens = TokenProvider::new(
            &config,
            http_client.clone(),
            SessionStore::new(),
            options.clone(),
        );

        let auth = FirebaseAuth::new(&config, http_client.clone(), tokens.clone(), options.clone());
        let firestore =
            FirestoreClient::new(&config, http_client.clone(), tokens.clone(), options.clone());
        let storage = StorageClient::new(&config, http_client.clone(), tokens, options.clone());

        Ok(Self {
            config,
            http_client,
            auth: Arc::new(auth),
            options,
            firestore: Arc::new(firestore),
            storage: Arc::new(storage),
        })
    }

    /// Document store client
    pub fn firestore(&self) -> &FirestoreClient {
        &self.firestore
    }

    /// Object storage client
    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// The three services as a [`Gateway`] for the pages
    pub fn gateway(&self) -> Gateway {
        Gateway::new(
            self.auth.clone(),
            self.firestore.clone(),
            self.storage.clone(),
        )
    }

    /// Application shell wired to this project
    pub fn app(&self) -> App {
        App::new(self.gateway())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::{ClientOptions, FirebaseConfig};
    pub use crate::error::Error;
    pub use crate::gateway::{AuthService, DocumentStore, Gateway, ObjectStorage};
    pub use crate::memory::MemoryGateway;
    pub use crate::model::{Car, CarImage, UserProfile};
    pub use crate::routes::{AppRoute, Screen};
    pub use crate::WebCarros;
}
