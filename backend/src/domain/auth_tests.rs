//! Tests for the login service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockAccessTokens, MockPasswordHasher, MockUserRepository};
use crate::domain::{ErrorCode, UserId};

fn sample_user() -> User {
    User::new(
        UserId::new(7),
        Email::new("payer@example.com").expect("valid email"),
        Some("Pay Er".to_owned()),
        "argon2-hash".to_owned(),
        false,
    )
}

fn service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockAccessTokens,
) -> AuthService {
    AuthService::new(Arc::new(users), Arc::new(hasher), Arc::new(tokens))
}

#[tokio::test]
async fn login_issues_token_for_valid_credentials() {
    let user = sample_user();
    let mut users = MockUserRepository::new();
    let found = user.clone();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(found)));

    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .times(1)
        .return_once(|_, _| true);

    let mut tokens = MockAccessTokens::new();
    tokens
        .expect_issue()
        .withf(|claims| claims.user_id == UserId::new(7) && !claims.is_admin)
        .times(1)
        .return_once(|_| Ok("signed-token".to_owned()));

    let login = service(users, hasher, tokens)
        .login(user.email(), "hunter2")
        .await
        .expect("login succeeds");

    assert_eq!(login.token, "signed-token");
    assert_eq!(login.user.id(), UserId::new(7));
}

#[tokio::test]
async fn login_rejects_unknown_email_without_issuing() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(0);
    let mut tokens = MockAccessTokens::new();
    tokens.expect_issue().times(0);

    let error = service(users, hasher, tokens)
        .login(
            &Email::new("nobody@example.com").expect("valid email"),
            "hunter2",
        )
        .await
        .expect_err("unknown email must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn login_rejects_wrong_password_with_the_same_error() {
    let user = sample_user();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(user)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).return_once(|_, _| false);
    let mut tokens = MockAccessTokens::new();
    tokens.expect_issue().times(0);

    let error = service(users, hasher, tokens)
        .login(&Email::new("payer@example.com").expect("valid email"), "no")
        .await
        .expect_err("wrong password must fail");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid email or password");
}

#[tokio::test]
async fn login_maps_connection_error_to_service_unavailable() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));
    let hasher = MockPasswordHasher::new();
    let tokens = MockAccessTokens::new();

    let error = service(users, hasher, tokens)
        .login(&Email::new("payer@example.com").expect("valid email"), "pw")
        .await
        .expect_err("connection failure surfaces");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
