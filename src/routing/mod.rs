//! Navigation-time authorization: the route gate, the per-route role table,
//! and role-scoped menus.
//!
//! Everything in here is a pure function over the session snapshot — the UI
//! shell evaluates these on each navigation and acts on the returned
//! decision.

pub mod gate;
pub mod nav;
pub mod routes;

pub use gate::{RouteDecision, authorize};
pub use nav::{NavItem, navigation_for};
pub use routes::route_roles;
