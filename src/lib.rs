//! # biblio
//!
//! Headless core of a role-based library management client. Replaces the
//! React SPA's auth/session plumbing with a Rust-native layer: the durable
//! session store, the auth session manager, the route authorization gate,
//! role-scoped navigation, and the bearer-authenticated REST client for
//! users, books, categories, and emprunts.
//!
//! Rendering is deliberately absent — everything here is the state and
//! decision logic a UI shell drives.

pub mod net;
pub mod routing;
pub mod state;
pub mod storage;
pub mod types;

pub use net::{ApiClient, ApiError, CredentialAuthority, Credentials, HttpCredentialAuthority};
pub use routing::{NavItem, RouteDecision, authorize, navigation_for, route_roles};
pub use state::{AuthManager, LoginError, Session};
pub use storage::{FileStore, MemoryStore, SessionStore, StoreError, StoredSession};
pub use types::{Book, Category, Emprunt, EmpruntStatus, Role, User};
