mod common;

use common::{Harness, cheap_hasher};
use uai_auth::CredentialHasher;
use uai_core::models::UserStatus;
use uai_server::auth::{AdminAccount, BootstrapOutcome, bootstrap_admin};
use uai_store::MemoryStore;

fn admin(password: &str) -> AdminAccount {
    AdminAccount {
        name: "Administrator".into(),
        email: "admin@example.com".into(),
        password_hash: cheap_hasher().hash(password).unwrap(),
    }
}

#[tokio::test]
async fn test_bootstrap_runs_once() {
    let h = Harness::new();

    let first = bootstrap_admin(&h.store, admin("admin-password"))
        .await
        .unwrap();
    let BootstrapOutcome::Created(admin_id) = first else {
        panic!("expected admin to be created, got {first:?}");
    };

    let users = h.store.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, admin_id);
    assert_eq!(users[0].status, UserStatus::Active);

    let grants = h.store.role_grants().await;
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].grantor, admin_id);
    assert_eq!(h.store.credentials().await.len(), 1);

    let second = bootstrap_admin(&h.store, admin("other-password"))
        .await
        .unwrap();
    assert_eq!(second, BootstrapOutcome::AlreadyPresent);

    assert_eq!(h.store.users().await, users);
    assert_eq!(h.store.role_grants().await, grants);
    let credentials = h.store.credentials().await;
    assert_eq!(credentials.len(), 1);
    assert!(h.password_matches("admin-password", &credentials[0].hashed_password));
}

#[tokio::test]
async fn test_bootstrapped_admin_can_log_in() {
    let h = Harness::new();
    bootstrap_admin(&h.store, admin("admin-password"))
        .await
        .unwrap();

    let issued = h
        .users
        .login("admin@example.com", "admin-password")
        .await
        .unwrap();
    assert!(!issued.token.is_empty());
}

#[tokio::test]
async fn test_bootstrap_requires_admin_role_row() {
    let store = MemoryStore::with_roles(Vec::new());

    let err = bootstrap_admin(&store, admin("admin-password"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("admin"));
    assert!(store.users().await.is_empty());
}
