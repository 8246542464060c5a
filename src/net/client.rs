//! Bearer-authenticated REST client for the library API.
//!
//! DESIGN
//! ======
//! One `ApiClient` per process, sharing the `AuthManager` so every request
//! picks up the current token. The single cross-cutting contract: any HTTP
//! 401 anywhere forces a global logout before the error is surfaced, because
//! a dead token invalidates the whole session, not one call.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::state::AuthManager;
use crate::types::{Book, Category, Emprunt, EmpruntStatus, Role, User};

/// API call failure taxonomy. None of these are fatal: the worst case is the
/// forced return to the login screen carried by [`ApiError::Unauthorized`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected our token. The whole session has already been
    /// torn down by the time this is returned.
    #[error("session rejected by server")]
    Unauthorized,
    /// Any non-success, non-401 answer.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    /// Transport or decode failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthManager>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, auth: Arc<AuthManager>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token, send, and apply the 401 rule.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let req = match self.auth.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("server rejected the session token, forcing logout");
            self.auth.force_logout();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.http.get(self.url(path))).await?;
        Ok(resp.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(resp.json().await?)
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.http.put(self.url(path)).json(body)).await?;
        Ok(resp.json().await?)
    }

    async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.http.put(self.url(path))).await?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }
}

// =============================================================================
// AUTH
// =============================================================================

impl ApiClient {
    /// `GET /auth/me` — the server's view of the current session.
    ///
    /// # Errors
    /// [`ApiError`]; a 401 here tears the session down like anywhere else.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/auth/me").await
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial user update; absent fields are left untouched by the server.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ApiClient {
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/users").await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{id}")).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post_json("/users", user).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError> {
        self.put_json(&format!("/users/{id}"), patch).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/users/{id}")).await
    }
}

// =============================================================================
// BOOKS
// =============================================================================

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub quantity: u32,
    pub category_id: String,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl ApiClient {
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.get_json("/books").await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn get_book(&self, id: &str) -> Result<Book, ApiError> {
        self.get_json(&format!("/books/{id}")).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        self.post_json("/books", book).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn update_book(&self, id: &str, patch: &BookPatch) -> Result<Book, ApiError> {
        self.put_json(&format!("/books/{id}"), patch).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/books/{id}")).await
    }
}

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct CategoryName {
    pub name: String,
}

impl ApiClient {
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories").await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn get_category(&self, id: &str) -> Result<Category, ApiError> {
        self.get_json(&format!("/categories/{id}")).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn create_category(&self, name: &str) -> Result<Category, ApiError> {
        self.post_json("/categories", &CategoryName { name: name.to_owned() }).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn update_category(&self, id: &str, name: &str) -> Result<Category, ApiError> {
        self.put_json(&format!("/categories/{id}"), &CategoryName { name: name.to_owned() }).await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{id}")).await
    }
}

// =============================================================================
// EMPRUNTS
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BorrowRequest<'a> {
    book_id: &'a str,
}

#[derive(Serialize)]
struct StatusUpdate {
    status: EmpruntStatus,
}

impl ApiClient {
    /// All emprunts, across borrowers (librarian/admin view).
    ///
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn list_emprunts(&self) -> Result<Vec<Emprunt>, ApiError> {
        self.get_json("/emprunts").await
    }

    /// The calling user's own emprunts.
    ///
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn my_emprunts(&self) -> Result<Vec<Emprunt>, ApiError> {
        self.get_json("/emprunts/my").await
    }

    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn get_emprunt(&self, id: &str) -> Result<Emprunt, ApiError> {
        self.get_json(&format!("/emprunts/{id}")).await
    }

    /// Borrow a book for the calling user.
    ///
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn borrow_book(&self, book_id: &str) -> Result<Emprunt, ApiError> {
        self.post_json("/emprunts", &BorrowRequest { book_id }).await
    }

    /// Mark an emprunt returned.
    ///
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn return_book(&self, id: &str) -> Result<Emprunt, ApiError> {
        self.put_empty(&format!("/emprunts/{id}/return")).await
    }

    /// Set an emprunt's lifecycle status (librarian/admin operation).
    ///
    /// # Errors
    /// [`ApiError`] on transport, status, or decode failure.
    pub async fn set_emprunt_status(
        &self,
        id: &str,
        status: EmpruntStatus,
    ) -> Result<Emprunt, ApiError> {
        self.put_json(&format!("/emprunts/{id}/status"), &StatusUpdate { status }).await
    }
}
