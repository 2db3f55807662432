//! Server bootstrap: settings, migrations, and state wiring.

mod config;

pub use config::AppSettings;

use std::sync::Arc;

use color_eyre::eyre::{WrapErr, eyre};
use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use backend::api::AppState;
use backend::domain::ports::{
    AccessTokens, AccountRepository, PasswordHasher, PaymentRepository, UserRepository,
};
use backend::domain::{
    AdminService, AuthService, PaymentIngestionService, ProfileService, WebhookSecret,
};
use backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselPaymentRepository, DieselUserRepository, PgLedger,
    PoolConfig,
};
use backend::outbound::security::{Argon2Hasher, JwtAccessTokens};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations on a dedicated blocking connection.
///
/// The migration harness is synchronous, so it runs inside `spawn_blocking`
/// on an `AsyncConnectionWrapper` rather than on a pooled connection.
pub async fn run_migrations(database_url: &str) -> color_eyre::Result<()> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || -> color_eyre::Result<()> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
            .wrap_err("failed to connect for migrations")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| eyre!("failed to run migrations: {err}"))?;
        Ok(())
    })
    .await
    .wrap_err("migration task panicked")?
}

/// Build the connection pool from the settings.
pub async fn build_pool(settings: &AppSettings) -> color_eyre::Result<DbPool> {
    let config =
        PoolConfig::new(settings.database_url()?).with_max_size(settings.db_pool_size());
    DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")
}

/// Wire the domain services over the PostgreSQL adapters.
pub fn build_app_state(pool: &DbPool, settings: &AppSettings) -> color_eyre::Result<AppState> {
    let ledger = Arc::new(PgLedger::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let accounts: Arc<dyn AccountRepository> =
        Arc::new(DieselAccountRepository::new(pool.clone()));
    let payments: Arc<dyn PaymentRepository> =
        Arc::new(DieselPaymentRepository::new(pool.clone()));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let tokens: Arc<dyn AccessTokens> = Arc::new(JwtAccessTokens::new(
        settings.jwt_secret()?.as_bytes(),
        settings.token_ttl(),
    ));

    Ok(AppState {
        ingestion: PaymentIngestionService::new(
            ledger,
            WebhookSecret::new(settings.webhook_secret()?),
        ),
        auth: AuthService::new(Arc::clone(&users), Arc::clone(&hasher), Arc::clone(&tokens)),
        admin: AdminService::new(Arc::clone(&users), Arc::clone(&accounts), hasher),
        profile: ProfileService::new(users, accounts, payments),
        tokens,
        ingest_timeout: settings.ingest_timeout(),
    })
}
