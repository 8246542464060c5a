//! HTTP surface: the credential authority and the bearer-authenticated
//! CRUD client.


pub mod authority;
pub mod client;

pub use authority::{AuthorityError, CredentialAuthority, Credentials, HttpCredentialAuthority};
pub use client::{ApiClient, ApiError};

/// API base URL from `BIBLIO_API_URL`, falling back to the dev server.
#[must_use]
pub fn default_base_url() -> String {
    std::env::var("BIBLIO_API_URL").unwrap_or_else(|_| "http://localhost:8080/api".to_owned())
}
