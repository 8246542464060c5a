//! The route authorization gate.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use crate::state::Session;
use crate::types::Role;

/// Outcome of evaluating the gate for one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still resolving: render a neutral pending indicator and make
    /// no redirect decision. Redirecting now would flash restored users to
    /// the login screen on every reload.
    Pending,
    /// Not authenticated: go to the login entry point. `from` carries the
    /// attempted destination so the shell can return there after login.
    ToLogin { from: String },
    /// Authenticated but the role is not admitted here: go to the role's
    /// canonical home instead.
    ToHome { destination: &'static str },
    /// Render the guarded content.
    Allow,
}

/// Decide whether `attempted` may render for the current session.
///
/// Pure and idempotent: the same inputs always yield the same decision, and
/// evaluating it has no side effects.
#[must_use]
pub fn authorize(
    session: &Session,
    allowed_roles: Option<&[Role]>,
    attempted: &str,
) -> RouteDecision {
    if session.is_loading() {
        return RouteDecision::Pending;
    }
    if !session.is_authenticated() {
        return RouteDecision::ToLogin { from: attempted.to_owned() };
    }
    if let (Some(allowed), Some(role)) = (allowed_roles, session.role()) {
        if !allowed.contains(&role) {
            return RouteDecision::ToHome { destination: role.home_path() };
        }
    }
    RouteDecision::Allow
}
