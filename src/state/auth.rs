//! The auth session manager: login, logout, and one-shot session restore.
//!
//! DESIGN
//! ======
//! One `Session` value per manager, mutated only here. The state machine is
//! `RESOLVING -> {UNAUTHENTICATED, AUTHENTICATED}` with logout always landing
//! on `UNAUTHENTICATED`; nothing transitions back into `RESOLVING`.
//!
//! A monotonic epoch guards against a login result arriving after an
//! interleaved logout: the result is discarded instead of resurrecting the
//! stale session. A second login while one is in flight is rejected outright.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::net::authority::{AuthorityError, CredentialAuthority};
use crate::storage::{SessionStore, StoredSession};
use crate::types::User;

use super::session::Session;

/// Why a login attempt did not establish a session.
///
/// These are values, never panics: login forms need to stay interactive.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The credential authority rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The credential authority could not be reached or answered garbage.
    #[error("authentication request failed: {0}")]
    Authority(String),
    /// Another login attempt from this session is still in flight.
    #[error("a login attempt is already in flight")]
    AlreadyPending,
    /// A logout happened while the attempt was in flight; the late result
    /// was discarded.
    #[error("login superseded by logout")]
    Superseded,
}

struct Inner {
    session: Session,
    /// Bumped by every logout; a login only applies if the epoch it started
    /// under is still current.
    epoch: u64,
    login_pending: bool,
}

/// Owns the process's single [`Session`] and every transition on it.
pub struct AuthManager {
    store: Box<dyn SessionStore>,
    authority: Box<dyn CredentialAuthority>,
    inner: Mutex<Inner>,
}

impl AuthManager {
    #[must_use]
    pub fn new(
        store: impl SessionStore + 'static,
        authority: impl CredentialAuthority + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            authority: Box::new(authority),
            inner: Mutex::new(Inner {
                session: Session::resolving(),
                epoch: 0,
                login_pending: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    /// Bearer token of the current session, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().session.token().map(str::to_owned)
    }

    /// True while a login exchange is in flight. Lets the UI disable
    /// re-submission instead of racing a second attempt.
    #[must_use]
    pub fn login_in_flight(&self) -> bool {
        self.lock().login_pending
    }

    /// Consult persisted storage and leave the resolving state.
    ///
    /// Runs at most once; later calls are no-ops. A storage failure counts
    /// as "no session" and the store is purged so the next start is clean.
    pub fn resolve(&self) {
        let mut inner = self.lock();
        if !inner.session.is_loading() {
            return;
        }
        inner.session = match self.store.restore() {
            Ok(Some(stored)) => {
                debug!(email = %stored.user.email, "restored persisted session");
                Session::established(stored.user, stored.token)
            }
            Ok(None) => Session::anonymous(),
            Err(e) => {
                warn!(error = %e, "session restore failed, starting unauthenticated");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "could not purge session storage");
                }
                Session::anonymous()
            }
        };
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// On success the `{user, token}` pair is persisted and the session flips
    /// to authenticated in one step. On failure the session stays exactly as
    /// it was.
    ///
    /// # Errors
    /// [`LoginError::InvalidCredentials`] on rejection,
    /// [`LoginError::Authority`] on transport/protocol faults,
    /// [`LoginError::AlreadyPending`] if another login is in flight, and
    /// [`LoginError::Superseded`] if a logout won the race.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let epoch = {
            let mut inner = self.lock();
            if inner.login_pending {
                return Err(LoginError::AlreadyPending);
            }
            inner.login_pending = true;
            inner.epoch
        };

        // No lock held across the credential exchange.
        let outcome = self.authority.authenticate(email, password).await;

        let mut inner = self.lock();
        inner.login_pending = false;

        let credentials = match outcome {
            Ok(credentials) => credentials,
            Err(AuthorityError::InvalidCredentials) => {
                info!(email, "login rejected: invalid credentials");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => {
                warn!(email, error = %e, "login failed");
                return Err(LoginError::Authority(e.to_string()));
            }
        };

        if inner.epoch != epoch {
            info!(email, "discarding login result that arrived after logout");
            return Err(LoginError::Superseded);
        }

        let stored = StoredSession {
            user: credentials.user.clone(),
            token: credentials.token.clone(),
        };
        if let Err(e) = self.store.persist(&stored) {
            // A session that survives only until the next restart is still a
            // session; the write failure is not a login failure.
            warn!(error = %e, "could not persist session, continuing in memory");
        }
        inner.session = Session::established(credentials.user.clone(), credentials.token);
        info!(email = %credentials.user.email, role = ?credentials.user.role, "login succeeded");
        Ok(credentials.user)
    }

    /// Tear down the session.
    ///
    /// Local state and storage are cleared first and unconditionally; the
    /// server-side invalidation afterwards is best-effort and its failure is
    /// ignored. A stranded local token is worse than a missed remote revoke.
    pub async fn logout(&self) {
        let token = self.clear_local("logout");
        if let Some(token) = token {
            if let Err(e) = self.authority.invalidate(&token).await {
                debug!(error = %e, "server-side session invalidation failed (ignored)");
            }
        }
    }

    /// Immediate local teardown with no server call. Used when the server has
    /// already declared the token dead (HTTP 401).
    pub fn force_logout(&self) {
        let _ = self.clear_local("server rejected token");
    }

    fn clear_local(&self, reason: &str) -> Option<String> {
        let token = {
            let mut inner = self.lock();
            let token = inner.session.token().map(str::to_owned);
            inner.epoch += 1;
            inner.session = Session::anonymous();
            token
        };
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear session storage");
        }
        if token.is_some() {
            info!(reason, "session cleared");
        }
        token
    }
}
