//! Role-scoped navigation menus.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::types::Role;

/// One sidebar entry: label plus destination route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

/// Admins see user management plus everything a librarian sees.
const ADMIN_NAV: &[NavItem] = &[
    item("Admin Dashboard", "/admin"),
    item("Users", "/admin/users"),
    item("Books", "/responsable/books"),
    item("Categories", "/responsable/categories"),
    item("Emprunts", "/responsable/emprunts"),
];

const RESPONSABLE_NAV: &[NavItem] = &[
    item("Dashboard", "/responsable"),
    item("Books", "/responsable/books"),
    item("Categories", "/responsable/categories"),
    item("Emprunts", "/responsable/emprunts"),
];

const CLIENT_NAV: &[NavItem] = &[
    item("Dashboard", "/client"),
    item("Browse Books", "/client/books"),
    item("My Emprunts", "/client/emprunts"),
];

/// Visible menu for a role, in display order. An absent or unrecognized role
/// gets no navigation at all, never an error.
#[must_use]
pub fn navigation_for(role: Option<Role>) -> &'static [NavItem] {
    match role {
        Some(Role::Admin) => ADMIN_NAV,
        Some(Role::Responsable) => RESPONSABLE_NAV,
        Some(Role::Client) => CLIENT_NAV,
        None => &[],
    }
}
