//! Authentication and user management through the Identity Toolkit API

mod session;
mod state;
mod token;
mod types;

use async_trait::async_trait;
use log::info;
use reqwest::Client;

use crate::config::{ClientOptions, FirebaseConfig};
use crate::error::Error;
use crate::fetch::Fetch;
use crate::gateway::AuthService;

pub use session::*;
pub use state::*;
pub use token::*;
pub use types::*;

/// Client for Firebase Authentication
pub struct FirebaseAuth {
    /// The web API key
    api_key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: SessionStore,

    /// Token source shared with the database and storage clients
    tokens: TokenProvider,

    /// Auth-state listeners
    notifier: AuthStateNotifier,

    /// Client options
    options: ClientOptions,
}

impl FirebaseAuth {
    /// Create a new auth client
    pub(crate) fn new(
        config: &FirebaseConfig,
        client: Client,
        tokens: TokenProvider,
        options: ClientOptions,
    ) -> Self {
        Self {
            api_key: config.api_key.clone(),
            client,
            session: tokens.session().clone(),
            tokens,
            notifier: AuthStateNotifier::new(),
            options,
        }
    }

    fn accounts_url(&self, action: &str) -> String {
        format!("{}/v1/accounts:{}", self.options.identity_url, action)
    }

    async fn password_request(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<User, Error> {
        let url = self.accounts_url(action);
        let body = Credentials {
            email,
            password,
            return_secure_token: true,
        };

        let result = Fetch::post(&self.client, &url)
            .query("key", &self.api_key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<AuthResponse>()
            .await
            .map_err(auth_error)?;

        let user = result.user();
        if self.options.persist_session {
            self.session.set(Session::new(
                result.id_token.clone(),
                result.refresh_token.clone(),
                user.clone(),
                parse_expires_in(&result.expires_in),
            ));
        }

        info!("Signed in as {}", user.uid);
        self.notifier.notify(Some(&user));
        Ok(user)
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, Error> {
        self.password_request("signUp", email, password).await
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, Error> {
        self.password_request("signInWithPassword", email, password)
            .await
    }

    /// Set the display name of the current user
    pub async fn update_profile(&self, display_name: &str) -> Result<User, Error> {
        let token = self.id_token().await?;
        let url = self.accounts_url("update");
        let body = UpdateProfileRequest {
            id_token: &token,
            display_name,
            return_secure_token: false,
        };

        let result = Fetch::post(&self.client, &url)
            .query("key", &self.api_key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<UpdateProfileResponse>()
            .await
            .map_err(auth_error)?;

        let name = result.display_name.clone();
        self.session.update_user(|u| u.display_name = name);

        Ok(User {
            uid: result.local_id,
            email: result.email,
            display_name: result.display_name,
        })
    }

    /// Exchange the refresh token for a new ID token
    pub async fn refresh_session(&self) -> Result<Session, Error> {
        self.tokens.refresh().await
    }

    /// ID token of the current session, refreshed first when expired
    pub async fn id_token(&self) -> Result<String, Error> {
        self.tokens.id_token().await
    }

    /// Sign out the current user
    ///
    /// Sessions are client-side only, so this never reaches the network.
    pub fn sign_out(&self) {
        if let Some(session) = self.session.get() {
            info!("Signed out {}", session.user.uid);
        }
        self.session.clear();
        self.notifier.notify(None);
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.session.get()
    }

    /// Restore a previously persisted session
    pub fn set_session(&self, session: Session) {
        let user = session.user.clone();
        self.session.set(session);
        self.notifier.notify(Some(&user));
    }
}

fn auth_error(err: Error) -> Error {
    match err {
        Error::Api { message, .. } => Error::Auth(message),
        other => other,
    }
}

#[async_trait]
impl AuthService for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, Error> {
        FirebaseAuth::sign_up(self, email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, Error> {
        FirebaseAuth::sign_in(self, email, password).await
    }

    async fn update_profile(&self, display_name: &str) -> Result<User, Error> {
        FirebaseAuth::update_profile(self, display_name).await
    }

    async fn sign_out(&self) -> Result<(), Error> {
        FirebaseAuth::sign_out(self);
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let current = self.session.user();
        self.notifier.subscribe(listener, current.as_ref())
    }
}
