//! The session value: current user, token, and derived flags.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::types::{Role, User};

/// Client-held authentication state.
///
/// Fields are private so `is_authenticated() == (user && token present)`
/// holds by construction; nothing outside [`super::AuthManager`] can flip
/// the flags out of step with the user and token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
    loading: bool,
}

impl Session {
    /// Startup state: persisted storage not yet consulted.
    #[must_use]
    pub fn resolving() -> Self {
        Self { user: None, token: None, loading: true }
    }

    /// Resolved with no authenticated user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None, token: None, loading: false }
    }

    /// Resolved and authenticated as `user` holding `token`.
    #[must_use]
    pub fn established(user: User, token: String) -> Self {
        Self { user: Some(user), token: Some(token), loading: false }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// True iff both a user and a token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// True only before the one-time restore from persisted storage resolves.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
