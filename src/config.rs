//! Configuration for the Firebase-backed client

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// Project credentials as shown in the Firebase console web-app snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    /// Web API key
    pub api_key: String,

    /// Auth domain (informational)
    #[serde(default)]
    pub auth_domain: Option<String>,

    /// Project identifier
    pub project_id: String,

    /// Default storage bucket
    pub storage_bucket: String,

    #[serde(default)]
    pub messaging_sender_id: Option<String>,

    #[serde(default)]
    pub app_id: Option<String>,

    #[serde(default)]
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    /// Minimal configuration: API key, project and bucket
    pub fn new(api_key: &str, project_id: &str, storage_bucket: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            auth_domain: None,
            project_id: project_id.to_string(),
            storage_bucket: storage_bucket.to_string(),
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
        }
    }

    /// Parse the JSON object copied from the console
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        if config.api_key.is_empty() || config.project_id.is_empty() {
            return Err(Error::general("apiKey and projectId must not be empty"));
        }
        Ok(config)
    }
}

/// Configuration options for the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to refresh the ID token when it has expired
    pub auto_refresh_token: bool,

    /// Keep the session after sign-up / sign-in
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Identity Toolkit base URL
    pub identity_url: String,

    /// Secure Token base URL
    pub secure_token_url: String,

    /// Firestore base URL
    pub firestore_url: String,

    /// Cloud Storage for Firebase base URL
    pub storage_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            secure_token_url: "https://securetoken.googleapis.com".to_string(),
            firestore_url: "https://firestore.googleapis.com".to_string(),
            storage_url: "https://firebasestorage.googleapis.com".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Point every service at a single base URL (emulators, mock servers)
    pub fn with_base_url(self, url: &str) -> Self {
        self.with_identity_url(url)
            .with_secure_token_url(url)
            .with_firestore_url(url)
            .with_storage_url(url)
    }

    pub fn with_identity_url(mut self, value: &str) -> Self {
        self.identity_url = trim_base(value);
        self
    }

    pub fn with_secure_token_url(mut self, value: &str) -> Self {
        self.secure_token_url = trim_base(value);
        self
    }

    pub fn with_firestore_url(mut self, value: &str) -> Self {
        self.firestore_url = trim_base(value);
        self
    }

    pub fn with_storage_url(mut self, value: &str) -> Self {
        self.storage_url = trim_base(value);
        self
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
