//! Tests for the administrative user service.

use std::sync::Arc;

use super::*;
use crate::domain::{AccountId, ErrorCode};
use crate::domain::ports::{MockAccountRepository, MockPasswordHasher, MockUserRepository};

fn service(users: MockUserRepository, hasher: MockPasswordHasher) -> AdminService {
    AdminService::new(
        Arc::new(users),
        Arc::new(MockAccountRepository::new()),
        Arc::new(hasher),
    )
}

fn service_with_accounts(
    users: MockUserRepository,
    accounts: MockAccountRepository,
) -> AdminService {
    AdminService::new(
        Arc::new(users),
        Arc::new(accounts),
        Arc::new(MockPasswordHasher::new()),
    )
}

fn sample_create() -> CreateUser {
    CreateUser {
        email: Email::new("new@example.com").expect("valid email"),
        full_name: Some("New User".to_owned()),
        password: "hunter2".to_owned(),
        is_admin: false,
    }
}

#[tokio::test]
async fn create_user_hashes_the_password_before_persisting() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "hunter2")
        .times(1)
        .return_once(|_| Ok("argon2-hash".to_owned()));

    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .withf(|new| new.password_hash == "argon2-hash" && !new.is_admin)
        .times(1)
        .return_once(|new| {
            Ok(User::new(
                UserId::new(1),
                new.email,
                new.full_name,
                new.password_hash,
                new.is_admin,
            ))
        });

    let user = service(users, hasher)
        .create_user(sample_create())
        .await
        .expect("creation succeeds");

    assert_eq!(user.id(), UserId::new(1));
    assert_eq!(user.password_hash(), "argon2-hash");
}

#[tokio::test]
async fn create_user_maps_duplicate_email_to_invalid_request() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Ok("argon2-hash".to_owned()));
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .times(1)
        .return_once(|new| Err(UserRepositoryError::duplicate_email(new.email.as_str())));

    let error = service(users, hasher)
        .create_user(sample_create())
        .await
        .expect_err("duplicate email must fail");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_user_leaves_password_untouched_when_not_supplied() {
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().times(0);
    let mut users = MockUserRepository::new();
    users
        .expect_update()
        .withf(|_, patch| patch.password_hash.is_none() && patch.is_admin == Some(true))
        .times(1)
        .return_once(|id, patch| {
            Ok(Some(User::new(
                id,
                Email::new("kept@example.com").expect("valid email"),
                None,
                "old-hash".to_owned(),
                patch.is_admin.unwrap_or(false),
            )))
        });

    let user = service(users, hasher)
        .update_user(
            UserId::new(3),
            UpdateUser {
                is_admin: Some(true),
                ..UpdateUser::default()
            },
        )
        .await
        .expect("update succeeds");

    assert!(user.is_admin());
    assert_eq!(user.password_hash(), "old-hash");
}

#[tokio::test]
async fn update_user_reports_not_found_for_missing_id() {
    let hasher = MockPasswordHasher::new();
    let mut users = MockUserRepository::new();
    users.expect_update().times(1).return_once(|_, _| Ok(None));

    let error = service(users, hasher)
        .update_user(UserId::new(99), UpdateUser::default())
        .await
        .expect_err("missing user must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_user_reports_not_found_for_missing_id() {
    let hasher = MockPasswordHasher::new();
    let mut users = MockUserRepository::new();
    users.expect_delete().times(1).return_once(|_| Ok(false));

    let error = service(users, hasher)
        .delete_user(UserId::new(99))
        .await
        .expect_err("missing user must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn user_accounts_returns_the_accounts_of_an_existing_user() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(1).return_once(|id| {
        Ok(Some(User::new(
            id,
            Email::new("payer@example.com").expect("valid email"),
            None,
            "hash".to_owned(),
            false,
        )))
    });
    let mut accounts = MockAccountRepository::new();
    accounts.expect_list_by_user().times(1).return_once(|user_id| {
        Ok(vec![Account::new(
            AccountId::new(42),
            user_id,
            rust_decimal::Decimal::ZERO,
            chrono::Utc::now(),
        )])
    });

    let listed = service_with_accounts(users, accounts)
        .user_accounts(UserId::new(7))
        .await
        .expect("listing succeeds");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), AccountId::new(42));
}

#[tokio::test]
async fn user_accounts_reports_not_found_for_missing_user() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let mut accounts = MockAccountRepository::new();
    accounts.expect_list_by_user().times(0);

    let error = service_with_accounts(users, accounts)
        .user_accounts(UserId::new(99))
        .await
        .expect_err("missing user must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_users_maps_connection_error_to_service_unavailable() {
    let hasher = MockPasswordHasher::new();
    let mut users = MockUserRepository::new();
    users
        .expect_list_with_accounts()
        .times(1)
        .return_once(|| Err(UserRepositoryError::connection("pool exhausted")));

    let error = service(users, hasher)
        .list_users()
        .await
        .expect_err("connection failure surfaces");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
