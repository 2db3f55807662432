//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Read-only account listings outside the ledger unit of work. Balances
//! read here are committed snapshots; the ingestion path never goes
//! through this adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, UserId};

use super::models::AccountRow;
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain account repository errors.
fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AccountRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain account repository errors.
fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AccountRepositoryError::connection("database connection error")
        }
        _ => AccountRepositoryError::query("database error"),
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AccountRow> = accounts::table
            .filter(accounts::user_id.eq(user_id.value()))
            .order(accounts::id.asc())
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(AccountRow::into_domain).collect())
    }
}
