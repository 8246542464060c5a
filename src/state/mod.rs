//! Client-side session state and the manager that owns its transitions.

pub mod auth;
pub mod session;

pub use auth::{AuthManager, LoginError};
pub use session::Session;
