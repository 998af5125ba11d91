//! Error handling for the Web Carros client

use std::fmt;
use thiserror::Error;

use crate::form::FieldErrors;

/// Unified error type for the Web Carros client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The platform answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The operation needs a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// Document store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored document does not have the expected shape
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// Form input rejected before reaching the gateway
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A listing was submitted without any uploaded image
    #[error("At least one image is required")]
    MissingImages,

    /// Only jpeg and png images can be attached to a listing
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),

    /// A staged image was asked to move to a state it cannot reach
    #[error("Invalid image transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new malformed record error
    pub fn malformed<T: fmt::Display>(id: &str, reason: T) -> Self {
        Error::MalformedRecord {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status carried by an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
