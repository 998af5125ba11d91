//! Types for authentication and user management

use serde::{Deserialize, Serialize};

/// A platform user as seen by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user identifier
    pub uid: String,

    /// The user's email address
    pub email: Option<String>,

    /// Display name set through a profile update
    pub display_name: Option<String>,
}

/// Email / password payload for sign-up and sign-in
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Response of `accounts:signUp` and `accounts:signInWithPassword`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The user ID
    pub local_id: String,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// Display name, only returned on sign-in
    #[serde(default)]
    pub display_name: Option<String>,

    /// The ID token
    pub id_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// Token lifetime in seconds, encoded as a decimal string
    pub expires_in: String,
}

impl AuthResponse {
    pub fn user(&self) -> User {
        User {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
        }
    }
}

/// Payload of `accounts:update` for profile changes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

/// Response of `accounts:update`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub local_id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response of the Secure Token refresh endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub user_id: String,
}
