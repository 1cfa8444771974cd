//! Auth flow tests: registration conflicts, credential checking and
//! single-use refresh-token rotation, driven against in-memory stores.

mod common;

use chrono::Duration;
use common::{auth_service, test_codec};
use inkpad::auth::{
    jwt::{JwtCodec, TokenCodec},
    service::{hash_token, AuthError},
};

#[tokio::test]
async fn register_same_email_twice_conflicts() {
    let (service, _, _) = auth_service(test_codec());

    service.register("a@x.com", "pw123").await.expect("first register");

    let result = service.register("a@x.com", "pw456").await;
    assert!(matches!(result, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn register_trims_email_whitespace() {
    let (service, users, _) = auth_service(test_codec());

    service.register("  a@x.com  ", "pw123").await.expect("register");

    // Stored trimmed, so the duplicate check catches re-registration and
    // login works with the canonical address.
    let result = service.register("a@x.com", "other").await;
    assert!(matches!(result, Err(AuthError::EmailTaken)));

    use inkpad::models::user::CredentialStore;
    let user = users.find_by_email("a@x.com").await.expect("lookup");
    assert!(user.is_some());

    service.login("a@x.com", "pw123").await.expect("login");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let (service, _, _) = auth_service(test_codec());

    service.register("a@x.com", "pw123").await.expect("register");

    let wrong_password = service.login("a@x.com", "nope").await.unwrap_err();
    let unknown_email = service.login("ghost@x.com", "pw123").await.unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn login_persists_sha256_digest_of_refresh_token() {
    let (service, _, refresh_tokens) = auth_service(test_codec());

    let user = service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    assert!(refresh_tokens.contains(user.id, &hash_token(&pair.refresh_token)));

    // The raw token itself is never persisted
    assert!(!refresh_tokens.contains(user.id, &pair.refresh_token));
}

#[tokio::test]
async fn refresh_rotates_the_stored_digest() {
    let (service, _, refresh_tokens) = auth_service(test_codec());

    let user = service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    let new_pair = service.refresh(&pair.refresh_token).await.expect("refresh");

    // Old digest gone, new digest present
    assert!(!refresh_tokens.contains(user.id, &hash_token(&pair.refresh_token)));
    assert!(refresh_tokens.contains(user.id, &hash_token(&new_pair.refresh_token)));
    assert_eq!(refresh_tokens.count(), 1);
}

#[tokio::test]
async fn consumed_refresh_token_is_rejected() {
    let (service, _, _) = auth_service(test_codec());

    service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    service.refresh(&pair.refresh_token).await.expect("first refresh");

    // The token's signature and expiry are still valid, but its digest was
    // deleted by the first refresh.
    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::RefreshTokenNotRecognized)));
}

#[tokio::test]
async fn expired_refresh_token_fails_before_any_store_access() {
    // Codec that issues refresh tokens which are expired on arrival
    let expired_codec = JwtCodec::new(
        common::TEST_SECRET,
        Duration::minutes(15),
        Duration::seconds(-3600),
    );
    let (service, _users, refresh_tokens) = auth_service(expired_codec);

    let user = service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::InvalidRefreshToken)));

    // Validation failed closed before the store was consulted: the digest
    // written at login is still there, untouched by rotation.
    assert!(refresh_tokens.contains(user.id, &hash_token(&pair.refresh_token)));
}

#[tokio::test]
async fn access_token_cannot_be_used_as_refresh_token() {
    let (service, _, _) = auth_service(test_codec());

    service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    let result = service.refresh(&pair.access_token).await;
    assert!(matches!(result, Err(AuthError::InvalidRefreshToken)));
}

#[tokio::test]
async fn refresh_for_vanished_user_is_rejected() {
    let (service, users, _) = auth_service(test_codec());

    let user = service.register("a@x.com", "pw123").await.expect("register");
    let pair = service.login("a@x.com", "pw123").await.expect("login");

    users.remove(user.id);

    let result = service.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(AuthError::InvalidRefreshToken)));
}

#[tokio::test]
async fn forged_but_unissued_token_is_not_recognized() {
    let (service, _, _) = auth_service(test_codec());

    let user = service.register("a@x.com", "pw123").await.expect("register");
    service.login("a@x.com", "pw123").await.expect("login");

    // Cryptographically valid token for the right user, but never issued
    // through login/refresh, so no digest exists for it.
    let unissued = test_codec().issue_refresh_token(user.id).expect("issue");

    let result = service.refresh(&unissued).await;
    assert!(matches!(result, Err(AuthError::RefreshTokenNotRecognized)));
}

/// The worked example from the service contract, end to end.
#[tokio::test]
async fn register_login_refresh_rotation_walkthrough() {
    let (service, _, _) = auth_service(test_codec());

    service.register("a@x.com", "pw123").await.expect("register succeeds");

    let conflict = service.register("a@x.com", "pw456").await;
    assert!(matches!(conflict, Err(AuthError::EmailTaken)));

    let pair = service.login("a@x.com", "pw123").await.expect("login yields a pair");

    let new_pair = service
        .refresh(&pair.refresh_token)
        .await
        .expect("refresh yields a new pair");
    assert_ne!(new_pair.refresh_token, pair.refresh_token);

    let replay = service.refresh(&pair.refresh_token).await;
    assert!(matches!(replay, Err(AuthError::RefreshTokenNotRecognized)));
}
