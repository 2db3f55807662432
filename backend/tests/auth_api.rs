//! HTTP integration tests for login, profile, and administrative routes.

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use backend::domain::{
    AccountId, Email, TransactionId, User, UserId, WebhookSecret, compute_signature,
};
use backend::test_support::InMemoryStore;

use common::{WEBHOOK_SECRET, build_app, hash_password, issue_token, test_state};

fn seed_user(store: &InMemoryStore, id: i64, email: &str, is_admin: bool) -> User {
    store.seed_user(User::new(
        UserId::new(id),
        Email::new(email).expect("valid email"),
        Some("Pay Er".to_owned()),
        hash_password("hunter2"),
        is_admin,
    ))
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_rt::test]
async fn login_issues_a_usable_token() {
    let store = InMemoryStore::new();
    seed_user(&store, 7, "payer@example.com", false);
    let app = init_service(build_app(test_state(&store))).await;

    let response = call_service(
        &app,
        TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "payer@example.com", "password": "hunter2"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "payer@example.com");
    let token = body["access_token"].as_str().expect("token present");

    let me = call_service(
        &app,
        TestRequest::get()
            .uri("/users/me")
            .insert_header(bearer(token))
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = read_body_json(me).await;
    assert_eq!(body["id"], 7);
}

#[actix_rt::test]
async fn login_with_wrong_password_is_unauthorized() {
    let store = InMemoryStore::new();
    seed_user(&store, 7, "payer@example.com", false);
    let app = init_service(build_app(test_state(&store))).await;

    let response = call_service(
        &app,
        TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "payer@example.com", "password": "wrong"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn profile_routes_require_a_token() {
    let store = InMemoryStore::new();
    let app = init_service(build_app(test_state(&store))).await;

    for uri in ["/users/me", "/users/me/accounts", "/users/me/payments"] {
        let response = call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "route {uri}");
    }
}

#[actix_rt::test]
async fn ingested_payments_show_up_in_the_profile() {
    let store = InMemoryStore::new();
    seed_user(&store, 7, "payer@example.com", false);
    let app = init_service(build_app(test_state(&store))).await;

    let amount = dec!(19.99);
    let signature = compute_signature(
        AccountId::new(42),
        amount,
        &TransactionId::new("tx-1").expect("valid id"),
        UserId::new(7),
        &WebhookSecret::new(WEBHOOK_SECRET),
    );
    let webhook = call_service(
        &app,
        TestRequest::post()
            .uri("/webhooks/payment")
            .set_json(json!({
                "transaction_id": "tx-1",
                "account_id": 42,
                "user_id": 7,
                "amount": "19.99",
                "signature": signature,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(webhook.status(), StatusCode::CREATED);

    let token = issue_token(UserId::new(7), false);

    let accounts = call_service(
        &app,
        TestRequest::get()
            .uri("/users/me/accounts")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(accounts.status(), StatusCode::OK);
    let body: Value = read_body_json(accounts).await;
    assert_eq!(body[0]["id"], 42);
    assert_eq!(body[0]["balance"], json!(19.99));

    let payments = call_service(
        &app,
        TestRequest::get()
            .uri("/users/me/payments")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(payments.status(), StatusCode::OK);
    let body: Value = read_body_json(payments).await;
    assert_eq!(body[0]["transaction_id"], "tx-1");
    assert_eq!(body[0]["amount"], json!(19.99));
}

#[actix_rt::test]
async fn admin_routes_reject_non_admin_callers() {
    let store = InMemoryStore::new();
    seed_user(&store, 7, "payer@example.com", false);
    let app = init_service(build_app(test_state(&store))).await;
    let token = issue_token(UserId::new(7), false);

    for uri in ["/admin/me", "/admin/users"] {
        let response = call_service(
            &app,
            TestRequest::get()
                .uri(uri)
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "route {uri}");
    }
}

#[actix_rt::test]
async fn admin_me_returns_the_administrators_own_record() {
    let store = InMemoryStore::new();
    seed_user(&store, 1, "root@example.com", true);
    let app = init_service(build_app(test_state(&store))).await;
    let token = issue_token(UserId::new(1), true);

    let response = call_service(
        &app,
        TestRequest::get()
            .uri("/admin/me")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["email"], "root@example.com");
    assert_eq!(body["is_admin"], true);
}

#[actix_rt::test]
async fn admin_can_provision_update_and_delete_users() {
    let store = InMemoryStore::new();
    seed_user(&store, 1, "root@example.com", true);
    let app = init_service(build_app(test_state(&store))).await;
    let token = issue_token(UserId::new(1), true);

    let created = call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "email": "new@example.com",
                "full_name": "New User",
                "password": "hunter2",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = read_body_json(created).await;
    let new_id = body["id"].as_i64().expect("id present");
    assert_eq!(body["is_admin"], false);

    let updated = call_service(
        &app,
        TestRequest::patch()
            .uri(&format!("/admin/users/{new_id}"))
            .insert_header(bearer(&token))
            .set_json(json!({"is_admin": true}))
            .to_request(),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body: Value = read_body_json(updated).await;
    assert_eq!(body["is_admin"], true);

    let accounts = call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/admin/users/{new_id}/accounts"))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(accounts.status(), StatusCode::OK);
    let body: Value = read_body_json(accounts).await;
    assert_eq!(body, json!([]));

    let listed = call_service(
        &app,
        TestRequest::get()
            .uri("/admin/users")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = read_body_json(listed).await;
    assert_eq!(body.as_array().expect("array body").len(), 2);

    let deleted = call_service(
        &app,
        TestRequest::delete()
            .uri(&format!("/admin/users/{new_id}"))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = call_service(
        &app,
        TestRequest::delete()
            .uri(&format!("/admin/users/{new_id}"))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn duplicate_email_on_provisioning_is_a_bad_request() {
    let store = InMemoryStore::new();
    seed_user(&store, 1, "root@example.com", true);
    let app = init_service(build_app(test_state(&store))).await;
    let token = issue_token(UserId::new(1), true);

    let response = call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "email": "root@example.com",
                "password": "hunter2",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}
