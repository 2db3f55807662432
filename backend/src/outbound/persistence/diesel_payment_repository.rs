//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.
//!
//! Read-only payment history outside the ledger unit of work.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError};
use crate::domain::{Payment, UserId};

use super::models::PaymentRow;
use super::pool::{DbPool, PoolError};
use super::schema::payments;

/// Diesel-backed implementation of the `PaymentRepository` port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain payment repository errors.
fn map_pool_error(error: PoolError) -> PaymentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PaymentRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain payment repository errors.
fn map_diesel_error(error: diesel::result::Error) -> PaymentRepositoryError {
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
            PaymentRepositoryError::connection("database connection error")
        }
        _ => PaymentRepositoryError::query("database error"),
    }
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::user_id.eq(user_id.value()))
            .order(payments::id.asc())
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                row.into_domain()
                    .map_err(|err| PaymentRepositoryError::query(err.to_string()))
            })
            .collect()
    }
}
