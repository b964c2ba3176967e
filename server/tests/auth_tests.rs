//! Registration, login and token resolution.

mod common;

use kooking_server::auth::SigningKeyError;
use kooking_server::clock::{Clock, FixedClock};
use kooking_server::config::AppConfig;
use kooking_server::error::AppError;
use kooking_server::models::ROLE_USER;
use kooking_server::store::{MemoryStore, Store};
use kooking_server::types::{LoginRequest, PreferencesBody, RegisterRequest};
use kooking_server::AppContext;
use std::sync::Arc;

fn registration(email: &str, password: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn test_register_creates_user_with_empty_preferences() {
    let state = common::app();
    let profile = state
        .auth()
        .register(registration("a@x.com", "pw123456", "pw123456"))
        .unwrap();
    assert_eq!(profile.email, "a@x.com");

    let user = state
        .store
        .transaction(|repo| repo.find_user_by_email("a@x.com"))
        .unwrap()
        .unwrap();
    assert_eq!(user.id, profile.id);
    assert!(user.has_role(ROLE_USER));
    assert_ne!(user.password_hash, "pw123456");
    assert_eq!(state.users().preferences(&user).unwrap(), PreferencesBody::default());
    let stored = state
        .store
        .transaction(|repo| repo.find_preferences(user.id))
        .unwrap();
    assert!(stored.is_some());
}

#[test]
fn test_register_same_email_twice_conflicts() {
    let state = common::app();
    state
        .auth()
        .register(registration("a@x.com", "pw123456", "pw123456"))
        .unwrap();
    let err = state
        .auth()
        .register(registration("A@X.com", "pw123456", "pw123456"))
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_register_mismatch_fails_before_storage() {
    let (state, store) = common::counted_app();
    let err = state
        .auth()
        .register(registration("a@x.com", "pw123456", "pw654321"))
        .unwrap_err();
    match err {
        AppError::InvalidArgument(message) => assert_eq!(message, "Passwords do not match"),
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
    assert_eq!(store.count(), 0);
}

#[test]
fn test_register_validates_fields() {
    let state = common::app();
    let cases = [
        registration("not-an-email", "pw123456", "pw123456"),
        registration("a@x.com", "short", "short"),
        registration("a@x.com", "waytoolongpassword1234", "waytoolongpassword1234"),
        RegisterRequest {
            first_name: "Al".to_string(),
            ..registration("a@x.com", "pw123456", "pw123456")
        },
    ];
    for case in cases {
        let err = state.auth().register(case).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)), "{err:?}");
    }
}

#[test]
fn test_login_issues_a_token_that_resolves() {
    let state = common::app();
    let profile = state
        .auth()
        .register(registration("a@x.com", "pw123456", "pw123456"))
        .unwrap();

    let response = state.auth().login(login("a@x.com", "pw123456")).unwrap();
    assert_eq!(response.message, "Login successful");

    let user = state.auth().resolve(&response.token).unwrap();
    assert_eq!(user.id, profile.id);
}

#[test]
fn test_login_failures() {
    let state = common::app();
    state
        .auth()
        .register(registration("a@x.com", "pw123456", "pw123456"))
        .unwrap();

    let err = state.auth().login(login("a@x.com", "wrongpass")).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = state.auth().login(login("nobody@x.com", "pw123456")).unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn test_resolve_rejects_garbage_and_unknown_users() {
    let state = common::app();
    assert!(matches!(
        state.auth().resolve("not.a.token").unwrap_err(),
        AppError::Unauthorized(_)
    ));

    // Signed correctly, but for an email nobody registered
    let token = state.tokens.generate("ghost@x.com").unwrap();
    assert!(matches!(
        state.auth().resolve(&token).unwrap_err(),
        AppError::Unauthorized(_)
    ));
}

#[test]
fn test_embedded_defaults_carry_no_signing_key() {
    let auth = AppConfig::defaults().unwrap().auth;
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(common::summer_noon()));
    let err = AppContext::build(&auth, store, clock).err().unwrap();
    assert!(matches!(err, SigningKeyError::TooShort { actual: 0, .. }));
}
