//! Allowed roles per guarded route.
//!
//! Admins are admitted to the book/category/emprunt management screens their
//! own menu links to; dashboards stay exclusive to their role.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::types::Role;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const RESPONSABLE_ONLY: &[Role] = &[Role::Responsable];
const CLIENT_ONLY: &[Role] = &[Role::Client];
/// Librarian management screens, shared with admins.
const MANAGEMENT: &[Role] = &[Role::Admin, Role::Responsable];

/// Allowed roles for `path`, or `None` for routes without a role restriction
/// (the login entry point and unknown paths, which fall through to the
/// not-found page).
#[must_use]
pub fn route_roles(path: &str) -> Option<&'static [Role]> {
    match path {
        "/admin" | "/admin/users" | "/admin/users/create" => Some(ADMIN_ONLY),
        p if p.starts_with("/admin/users/edit/") => Some(ADMIN_ONLY),
        "/responsable" => Some(RESPONSABLE_ONLY),
        "/responsable/books" | "/responsable/books/create" => Some(MANAGEMENT),
        p if p.starts_with("/responsable/books/edit/") => Some(MANAGEMENT),
        "/responsable/categories" | "/responsable/emprunts" => Some(MANAGEMENT),
        "/client" | "/client/books" | "/client/emprunts" => Some(CLIENT_ONLY),
        _ => None,
    }
}
