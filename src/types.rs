//! Domain model shared by the API client and the session layer.
//!
//! Shapes mirror the server's JSON wire format (camelCase keys, SCREAMING
//! enum tags). Ids are opaque server-issued strings.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Account role. Closed set: every role-conditional decision in the crate
/// (home redirect, navigation, route table) dispatches on this enum, so
/// adding a role is a one-place, compile-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Responsable,
    Client,
}

impl Role {
    /// Canonical landing route for the role. Total: no role lacks a home.
    #[must_use]
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Responsable => "/responsable",
            Role::Client => "/client",
        }
    }
}

/// Lifecycle status of a borrowing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmpruntStatus {
    /// Book is currently out.
    EnCours,
    /// Book has been returned.
    Retourne,
    /// Book is out past its due date.
    EnRetard,
}

/// An account. Immutable once loaded into a session; replaced wholesale on
/// login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub quantity: u32,
    pub category: Category,
    pub available: bool,
}

/// A borrowing record linking one user and one book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emprunt {
    pub id: String,
    pub borrower: User,
    pub book: Book,
    /// ISO-8601 date, as issued by the server.
    pub borrow_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub status: EmpruntStatus,
}
