//! Auth gateway against the backend's GoTrue service
//!
//! Wraps sign up, sign in, sign out and session retrieval. Auth failures
//! carry the service's response body verbatim; an unconfigured client is
//! rejected before any network I/O. Access tokens are never logged.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::Config;
use crate::error::Error;

/// The identity half of a session, as returned by the auth service
///
/// The role lives in the `profiles` table, not here; see
/// [`crate::session::SessionContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: SessionUser,
}

/// Auth client
pub struct Auth {
    config: Config,
    http_client: Client,
    session: watch::Sender<Option<Session>>,
}

impl Auth {
    pub(crate) fn new(config: Config, http_client: Client) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            config,
            http_client,
            session,
        }
    }

    /// Register a new user with email and password
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.config.ensure_configured()?;

        let url = format!("{}/auth/v1/signup", self.config.url);
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::auth(error_text));
        }

        let session: Session = response.json().await?;
        self.persist(session.clone());
        Ok(session)
    }

    /// Sign in with email and password
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        self.config.ensure_configured()?;

        let url = format!("{}/auth/v1/token?grant_type=password", self.config.url);
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::auth(error_text));
        }

        let session: Session = response.json().await?;
        self.persist(session.clone());
        Ok(session)
    }

    /// Exchange the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session, Error> {
        let session = self.get_session().ok_or(Error::MissingSession)?;

        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.config.url);
        let payload = serde_json::json!({
            "refresh_token": session.refresh_token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::auth(error_text));
        }

        let new_session: Session = response.json().await?;
        self.persist(new_session.clone());
        Ok(new_session)
    }

    /// Fetch the user record for the current session
    pub async fn get_user(&self) -> Result<SessionUser, Error> {
        let session = self.get_session().ok_or(Error::MissingSession)?;

        let url = format!("{}/auth/v1/user", self.config.url);
        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::auth(error_text));
        }

        Ok(response.json().await?)
    }

    /// Sign out, revoking the session server-side and clearing it locally
    pub async fn sign_out(&self) -> Result<(), Error> {
        let session = self.get_session().ok_or(Error::MissingSession)?;

        let url = format!("{}/auth/v1/logout", self.config.url);
        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::auth(error_text));
        }

        self.session.send_replace(None);
        Ok(())
    }

    /// The current session, if any
    pub fn get_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Watch for session changes (sign-in, refresh, sign-out)
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    fn persist(&self, session: Session) {
        if self.config.options.persist_session {
            self.session.send_replace(Some(session));
        }
    }
}
