//! Credential authority — the external login collaborator.

#[cfg(test)]
#[path = "authority_test.rs"]
mod authority_test;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::User;

/// A successful credential exchange: the authenticated user plus the bearer
/// token the server minted for them.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub user: User,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication transport failed: {0}")]
    Transport(String),
    #[error("unexpected authority response: {0}")]
    UnexpectedResponse(String),
}

/// External credential authority: exchanges an email/password pair for a
/// session grant.
#[async_trait]
pub trait CredentialAuthority: Send + Sync {
    /// Validate `email`/`password` and mint a session.
    ///
    /// # Errors
    /// [`AuthorityError::InvalidCredentials`] on rejection; transport and
    /// decode faults map to the other variants.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Credentials, AuthorityError>;

    /// Best-effort server-side invalidation of `token`. Local logout never
    /// waits on this succeeding.
    ///
    /// # Errors
    /// Transport faults; callers are expected to ignore them.
    async fn invalidate(&self, token: &str) -> Result<(), AuthorityError>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// REST credential authority: `POST {base}/auth/login` and
/// `POST {base}/auth/logout`.
#[derive(Clone, Debug)]
pub struct HttpCredentialAuthority {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCredentialAuthority {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl CredentialAuthority for HttpCredentialAuthority {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Credentials, AuthorityError> {
        let url = format!("{}/auth/login", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            resp.json::<Credentials>()
                .await
                .map_err(|e| AuthorityError::UnexpectedResponse(e.to_string()))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AuthorityError::InvalidCredentials)
        } else {
            Err(AuthorityError::UnexpectedResponse(format!("login returned {status}")))
        }
    }

    async fn invalidate(&self, token: &str) -> Result<(), AuthorityError> {
        let url = format!("{}/auth/logout", self.base_url);
        self.http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;
        debug!("server-side session invalidated");
        Ok(())
    }
}
