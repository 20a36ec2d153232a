mod common;

use chrono::Duration;
use common::Harness;
use uai_auth::{Scope, TokenMaker};
use uai_core::models::UserStatus;
use uai_server::{AuthFailure, ServiceError};
use uuid::Uuid;

#[tokio::test]
async fn test_activation_sets_password_and_issues_auth_token() {
    let h = Harness::new();
    let user = h.onboard("ada@example.com").await;
    let token = h.activation_token(&user);

    let activation = h
        .users
        .activate_user(&token, "correct horse battery")
        .await
        .unwrap();

    assert_eq!(activation.user.id, user.id);
    assert_eq!(activation.user.status, UserStatus::Active);
    assert_eq!(activation.user.version, 2);

    let payload = h
        .tokens
        .verify_token(&activation.token.token, Scope::Authentication)
        .unwrap();
    assert_eq!(payload.subject, user.id);
    assert_eq!(activation.token.expires_at, h.clock_now() + Duration::hours(1));

    let credentials = h.store.credentials().await;
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].user_id, user.id);
    assert_eq!(credentials[0].email, "ada@example.com");
    assert!(h.password_matches("correct horse battery", &credentials[0].hashed_password));
}

#[tokio::test]
async fn test_expired_token_never_reaches_store() {
    let h = Harness::new();
    let user = h.onboard("late@example.com").await;
    let token = h.activation_token(&user);

    h.clock.advance(Duration::hours(72));
    let ops_before = h.store.operation_count();

    let err = h
        .users
        .activate_user(&token, "correct horse battery")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Unauthenticated(AuthFailure::ExpiredToken)
    ));
    assert_eq!(h.store.operation_count(), ops_before);
}

#[tokio::test]
async fn test_authentication_token_cannot_activate() {
    let h = Harness::new();
    let user = h.onboard("scope@example.com").await;
    let token = h
        .tokens
        .create_token(user.id, Scope::Authentication)
        .unwrap();
    let ops_before = h.store.operation_count();

    let err = h
        .users
        .activate_user(&token, "correct horse battery")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Unauthenticated(AuthFailure::InvalidToken)
    ));
    assert_eq!(h.store.operation_count(), ops_before);
}

#[tokio::test]
async fn test_unknown_subject_looks_like_invalid_token() {
    let h = Harness::new();
    let token = h
        .tokens
        .create_token(Uuid::new_v4(), Scope::Activation)
        .unwrap();

    let err = h
        .users
        .activate_user(&token, "correct horse battery")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Unauthenticated(AuthFailure::InvalidToken)
    ));
    assert!(h.store.credentials().await.is_empty());
}

#[tokio::test]
async fn test_second_activation_conflicts() {
    let h = Harness::new();
    let user = h.onboard("again@example.com").await;
    let token = h.activation_token(&user);

    h.users.activate_user(&token, "first password").await.unwrap();
    let err = h
        .users
        .activate_user(&token, "second password")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    let users = h.store.users().await;
    assert_eq!(users[0].version, 2);
    let credentials = h.store.credentials().await;
    assert_eq!(credentials.len(), 1);
    assert!(h.password_matches("first password", &credentials[0].hashed_password));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activation_has_one_winner() {
    let h = Harness::new();
    let user = h.onboard("race@example.com").await;
    let token = h.activation_token(&user);

    let attempts: Vec<_> = (0..2)
        .map(|i| {
            let users = h.users.clone();
            let token = token.clone();
            tokio::spawn(async move {
                users
                    .activate_user(&token, &format!("password-{i}-long"))
                    .await
            })
        })
        .collect();

    let mut ok = 0;
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => ok += 1,
            Err(ServiceError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(h.store.credentials().await.len(), 1);

    let users = h.store.users().await;
    assert_eq!(users[0].status, UserStatus::Active);
    assert_eq!(users[0].version, 2);
}
