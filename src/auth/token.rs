//! Bearer tokens for the REST clients

use log::debug;
use reqwest::Client;

use super::session::{parse_expires_in, Session, SessionStore};
use super::types::RefreshResponse;
use crate::config::{ClientOptions, FirebaseConfig};
use crate::error::Error;
use crate::fetch::Fetch;

/// Hands out the current ID token, refreshing an expired session first
#[derive(Debug, Clone)]
pub struct TokenProvider {
    api_key: String,
    client: Client,
    session: SessionStore,
    options: ClientOptions,
}

impl TokenProvider {
    pub(crate) fn new(
        config: &FirebaseConfig,
        client: Client,
        session: SessionStore,
        options: ClientOptions,
    ) -> Self {
        Self {
            api_key: config.api_key.clone(),
            client,
            session,
            options,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Exchange the refresh token for a new ID token
    pub async fn refresh(&self) -> Result<Session, Error> {
        let session = self.session.get().ok_or(Error::NotSignedIn)?;
        let url = format!("{}/v1/token", self.options.secure_token_url);

        let body = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": session.refresh_token,
        });

        let result = Fetch::post(&self.client, &url)
            .query("key", &self.api_key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<RefreshResponse>()
            .await
            .map_err(|err| match err {
                Error::Api { message, .. } => Error::Auth(message),
                other => other,
            })?;

        debug!("Refreshed ID token for {}", session.user.uid);
        let refreshed = Session::new(
            result.id_token,
            result.refresh_token,
            session.user,
            parse_expires_in(&result.expires_in),
        );
        self.session.set(refreshed.clone());
        Ok(refreshed)
    }

    /// Token for the `Authorization` header; `None` when nobody is signed in
    pub async fn bearer(&self) -> Result<Option<String>, Error> {
        let Some(session) = self.session.get() else {
            return Ok(None);
        };
        if session.is_expired() && self.options.auto_refresh_token {
            return Ok(Some(self.refresh().await?.id_token));
        }
        Ok(Some(session.id_token))
    }

    /// Token of the signed-in user
    pub async fn id_token(&self) -> Result<String, Error> {
        self.bearer().await?.ok_or(Error::NotSignedIn)
    }
}
