use super::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::net::authority::{AuthorityError, CredentialAuthority, Credentials};
use crate::routing::{RouteDecision, authorize};
use crate::storage::{MemoryStore, StoredSession};
use crate::types::Role;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn stored_admin() -> StoredSession {
    StoredSession {
        user: User { id: "1".into(), email: "admin@library.com".into(), role: Role::Admin },
        token: "tok-restored".into(),
    }
}

// =============================================================================
// test doubles
// =============================================================================

/// Authority serving the three seeded demo accounts with a fixed password.
struct DemoAuthority;

#[async_trait]
impl CredentialAuthority for DemoAuthority {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Credentials, AuthorityError> {
        let (id, role) = match email {
            "admin@library.com" => ("1", Role::Admin),
            "librarian@library.com" => ("2", Role::Responsable),
            "client@library.com" => ("3", Role::Client),
            _ => return Err(AuthorityError::InvalidCredentials),
        };
        if password != "password123" {
            return Err(AuthorityError::InvalidCredentials);
        }
        Ok(Credentials {
            user: User { id: id.into(), email: email.into(), role },
            token: format!("tok-{id}"),
        })
    }

    async fn invalidate(&self, _token: &str) -> Result<(), AuthorityError> {
        Ok(())
    }
}

/// Authority whose transport is down.
struct DownAuthority;

#[async_trait]
impl CredentialAuthority for DownAuthority {
    async fn authenticate(&self, _email: &str, _password: &str) -> Result<Credentials, AuthorityError> {
        Err(AuthorityError::Transport("connection refused".into()))
    }

    async fn invalidate(&self, _token: &str) -> Result<(), AuthorityError> {
        Err(AuthorityError::Transport("connection refused".into()))
    }
}

/// Authority that blocks in `authenticate` until released, so tests can
/// interleave other operations with an in-flight login.
struct GatedAuthority {
    started: Arc<AtomicBool>,
    gate: Arc<Notify>,
}

#[async_trait]
impl CredentialAuthority for GatedAuthority {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<Credentials, AuthorityError> {
        self.started.store(true, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(Credentials {
            user: User { id: "9".into(), email: email.into(), role: Role::Client },
            token: "tok-gated".into(),
        })
    }

    async fn invalidate(&self, _token: &str) -> Result<(), AuthorityError> {
        Ok(())
    }
}

/// Authority recording every token it is asked to invalidate.
#[derive(Default)]
struct RecordingAuthority {
    invalidated: Arc<std::sync::Mutex<Vec<String>>>,
}

#[async_trait]
impl CredentialAuthority for RecordingAuthority {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<Credentials, AuthorityError> {
        Ok(Credentials {
            user: User { id: "7".into(), email: email.into(), role: Role::Client },
            token: "tok-recorded".into(),
        })
    }

    async fn invalidate(&self, token: &str) -> Result<(), AuthorityError> {
        self.invalidated.lock().unwrap().push(token.to_owned());
        Ok(())
    }
}

/// Store that fails every read and write, recording whether it was purged.
struct BrokenStore {
    cleared: Arc<AtomicBool>,
}

impl crate::storage::SessionStore for BrokenStore {
    fn restore(&self) -> Result<Option<StoredSession>, crate::storage::StoreError> {
        Err(crate::storage::StoreError::Io(std::io::Error::other("disk unavailable")))
    }

    fn persist(&self, _session: &StoredSession) -> Result<(), crate::storage::StoreError> {
        Err(crate::storage::StoreError::Io(std::io::Error::other("disk unavailable")))
    }

    fn clear(&self) -> Result<(), crate::storage::StoreError> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Store that restores a session but cannot be cleared.
struct StuckStore;

impl crate::storage::SessionStore for StuckStore {
    fn restore(&self) -> Result<Option<StoredSession>, crate::storage::StoreError> {
        Ok(Some(stored_admin()))
    }

    fn persist(&self, _session: &StoredSession) -> Result<(), crate::storage::StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), crate::storage::StoreError> {
        Err(crate::storage::StoreError::Io(std::io::Error::other("read-only filesystem")))
    }
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn starts_in_the_resolving_state() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    assert!(manager.session().is_loading());
    assert!(!manager.session().is_authenticated());
}

#[test]
fn resolve_with_empty_store_goes_unauthenticated() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    manager.resolve();
    let session = manager.session();
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
}

#[test]
fn resolve_restores_the_persisted_session() {
    let store = MemoryStore::new();
    store.persist(&stored_admin()).unwrap();
    let manager = AuthManager::new(store, DemoAuthority);
    manager.resolve();

    let session = manager.session();
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().email, "admin@library.com");
    assert_eq!(session.token(), Some("tok-restored"));
}

#[test]
fn resolve_runs_at_most_once() {
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), DemoAuthority);
    manager.resolve();
    assert!(!manager.session().is_authenticated());

    // A session appearing in storage later must not be picked up: the
    // resolving phase is over.
    store.persist(&stored_admin()).unwrap();
    manager.resolve();
    assert!(!manager.session().is_authenticated());
    assert!(!manager.session().is_loading());
}

#[test]
fn resolve_treats_store_failure_as_no_session() {
    init_tracing();
    let cleared = Arc::new(AtomicBool::new(false));
    let manager = AuthManager::new(BrokenStore { cleared: cleared.clone() }, DemoAuthority);
    manager.resolve();

    let session = manager.session();
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
    assert!(cleared.load(Ordering::SeqCst), "failed storage should be purged");
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_success_establishes_and_persists_the_session() {
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), DemoAuthority);
    manager.resolve();

    let user = manager.login("admin@library.com", "password123").await.unwrap();
    assert_eq!(user.role, Role::Admin);

    let session = manager.session();
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok-1"));

    let stored = store.restore().unwrap().unwrap();
    assert_eq!(stored.user.email, "admin@library.com");
    assert_eq!(stored.token, "tok-1");
}

#[tokio::test]
async fn admin_login_opens_admin_routes_and_bounces_off_client_routes() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    manager.resolve();
    manager.login("admin@library.com", "password123").await.unwrap();
    let session = manager.session();

    assert_eq!(authorize(&session, Some(&[Role::Admin]), "/admin"), RouteDecision::Allow);
    assert_eq!(
        authorize(&session, Some(&[Role::Client]), "/client"),
        RouteDecision::ToHome { destination: "/admin" },
    );
}

#[tokio::test]
async fn login_with_bad_password_leaves_state_unchanged() {
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), DemoAuthority);
    manager.resolve();

    let err = manager.login("admin@library.com", "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
}

#[tokio::test]
async fn login_with_unknown_email_is_rejected() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    manager.resolve();
    let err = manager.login("nobody@library.com", "password123").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
}

#[tokio::test]
async fn failed_login_keeps_an_existing_session() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    manager.resolve();
    manager.login("client@library.com", "password123").await.unwrap();

    let err = manager.login("client@library.com", "typo").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));

    let session = manager.session();
    assert!(session.is_authenticated());
    assert_eq!(session.user().unwrap().email, "client@library.com");
}

#[tokio::test]
async fn authority_transport_failure_is_a_value_not_a_panic() {
    let manager = AuthManager::new(MemoryStore::new(), DownAuthority);
    manager.resolve();
    let err = manager.login("admin@library.com", "password123").await.unwrap_err();
    assert!(matches!(err, LoginError::Authority(_)));
    assert!(!manager.session().is_authenticated());
}

#[tokio::test]
async fn login_persist_failure_still_authenticates_in_memory() {
    init_tracing();
    let manager = AuthManager::new(
        BrokenStore { cleared: Arc::new(AtomicBool::new(false)) },
        DemoAuthority,
    );
    manager.resolve();
    manager.login("client@library.com", "password123").await.unwrap();
    assert!(manager.session().is_authenticated());
}

// =============================================================================
// concurrent and late-arriving logins
// =============================================================================

async fn wait_for(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn second_login_while_one_is_in_flight_is_rejected() {
    let started = Arc::new(AtomicBool::new(false));
    let gate = Arc::new(Notify::new());
    let manager = Arc::new(AuthManager::new(
        MemoryStore::new(),
        GatedAuthority { started: started.clone(), gate: gate.clone() },
    ));
    manager.resolve();

    let first = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.login("client@library.com", "pw").await })
    };
    wait_for(&started).await;

    assert!(manager.login_in_flight());
    let err = manager.login("client@library.com", "pw").await.unwrap_err();
    assert!(matches!(err, LoginError::AlreadyPending));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(!manager.login_in_flight());
    assert!(manager.session().is_authenticated());
}

#[tokio::test]
async fn login_result_arriving_after_logout_is_discarded() {
    let started = Arc::new(AtomicBool::new(false));
    let gate = Arc::new(Notify::new());
    let store = MemoryStore::new();
    let manager = Arc::new(AuthManager::new(
        store.clone(),
        GatedAuthority { started: started.clone(), gate: gate.clone() },
    ));
    manager.resolve();

    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.login("client@library.com", "pw").await })
    };
    wait_for(&started).await;

    manager.logout().await;
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, LoginError::Superseded));
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
}

#[tokio::test]
async fn a_fresh_login_after_the_rejected_one_succeeds() {
    let started = Arc::new(AtomicBool::new(false));
    let gate = Arc::new(Notify::new());
    let manager = Arc::new(AuthManager::new(
        MemoryStore::new(),
        GatedAuthority { started: started.clone(), gate: gate.clone() },
    ));
    manager.resolve();

    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.login("client@library.com", "pw").await })
    };
    wait_for(&started).await;
    manager.logout().await;
    gate.notify_one();
    pending.await.unwrap().unwrap_err();

    // The in-flight flag must have been released by the discarded attempt.
    gate.notify_one();
    manager.login("client@library.com", "pw").await.unwrap();
    assert!(manager.session().is_authenticated());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_session_and_storage() {
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), DemoAuthority);
    manager.resolve();
    manager.login("librarian@library.com", "password123").await.unwrap();

    manager.logout().await;
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
}

#[tokio::test]
async fn logout_twice_in_a_row_is_harmless() {
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), DemoAuthority);
    manager.resolve();
    manager.login("client@library.com", "password123").await.unwrap();

    manager.logout().await;
    manager.logout().await;
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
}

#[tokio::test]
async fn logout_from_unauthenticated_is_a_no_op_teardown() {
    let manager = AuthManager::new(MemoryStore::new(), DemoAuthority);
    manager.resolve();
    manager.logout().await;
    assert!(!manager.session().is_authenticated());
}

#[tokio::test]
async fn logout_succeeds_even_when_storage_cannot_be_cleared() {
    init_tracing();
    let manager = AuthManager::new(StuckStore, DemoAuthority);
    manager.resolve();
    assert!(manager.session().is_authenticated());

    manager.logout().await;
    assert!(!manager.session().is_authenticated());
}

#[tokio::test]
async fn logout_succeeds_even_when_remote_invalidation_fails() {
    let store = MemoryStore::new();
    store.persist(&stored_admin()).unwrap();
    let manager = AuthManager::new(store.clone(), DownAuthority);
    manager.resolve();

    manager.logout().await;
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
}

#[tokio::test]
async fn logout_invalidates_the_minted_token_server_side() {
    let authority = RecordingAuthority::default();
    let invalidated = authority.invalidated.clone();
    let manager = AuthManager::new(MemoryStore::new(), authority);
    manager.resolve();
    manager.login("client@library.com", "pw").await.unwrap();

    manager.logout().await;
    assert_eq!(invalidated.lock().unwrap().as_slice(), ["tok-recorded"]);
}

// =============================================================================
// force_logout
// =============================================================================

#[tokio::test]
async fn force_logout_clears_locally_without_a_server_call() {
    let authority = RecordingAuthority::default();
    let invalidated = authority.invalidated.clone();
    let store = MemoryStore::new();
    let manager = AuthManager::new(store.clone(), authority);
    manager.resolve();
    manager.login("client@library.com", "pw").await.unwrap();

    manager.force_logout();
    assert!(!manager.session().is_authenticated());
    assert_eq!(store.restore().unwrap(), None);
    assert!(invalidated.lock().unwrap().is_empty());
}
