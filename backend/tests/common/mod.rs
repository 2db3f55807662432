//! Shared fixtures for the HTTP integration tests.

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, web};

use backend::api::AppState;
use backend::api::admin::{admin_me, create_user, delete_user, list_users, update_user, user_accounts};
use backend::api::auth::login;
use backend::api::users::{me, my_accounts, my_payments};
use backend::api::webhook::ingest_payment;
use backend::domain::ports::{
    AccessClaims, AccessTokens, AccountRepository, PasswordHasher, PaymentRepository,
    UserRepository,
};
use backend::domain::{
    AdminService, AuthService, PaymentIngestionService, ProfileService, UserId, WebhookSecret,
};
use backend::outbound::security::{Argon2Hasher, JwtAccessTokens};
use backend::test_support::InMemoryStore;

pub const WEBHOOK_SECRET: &str = "s3cr3t";
const JWT_SECRET: &[u8] = b"integration-signing-secret";

/// Build the handler state over an in-memory store.
pub fn test_state(store: &InMemoryStore) -> web::Data<AppState> {
    let users: Arc<dyn UserRepository> = Arc::new(store.clone());
    let accounts: Arc<dyn AccountRepository> = Arc::new(store.clone());
    let payments: Arc<dyn PaymentRepository> = Arc::new(store.clone());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let tokens: Arc<dyn AccessTokens> = Arc::new(JwtAccessTokens::new(
        JWT_SECRET,
        chrono::Duration::minutes(15),
    ));

    web::Data::new(AppState {
        ingestion: PaymentIngestionService::new(
            Arc::new(store.clone()),
            WebhookSecret::new(WEBHOOK_SECRET),
        ),
        auth: AuthService::new(Arc::clone(&users), Arc::clone(&hasher), Arc::clone(&tokens)),
        admin: AdminService::new(Arc::clone(&users), Arc::clone(&accounts), hasher),
        profile: ProfileService::new(users, accounts, payments),
        tokens,
        ingest_timeout: Duration::from_secs(2),
    })
}

/// Build the application with every route registered, as in production.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .service(ingest_payment)
        .service(login)
        .service(me)
        .service(my_accounts)
        .service(my_payments)
        .service(admin_me)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(user_accounts)
}

/// Issue a bearer token the way the login handler would.
pub fn issue_token(user_id: UserId, is_admin: bool) -> String {
    JwtAccessTokens::new(JWT_SECRET, chrono::Duration::minutes(15))
        .issue(&AccessClaims { user_id, is_admin })
        .expect("token issuing succeeds")
}

/// Hash a password the way the admin provisioning path would.
pub fn hash_password(password: &str) -> String {
    Argon2Hasher::new()
        .hash(password)
        .expect("hashing succeeds")
}
