//! PostgreSQL-backed ledger unit of work using Diesel ORM.
//!
//! Implements the domain's `LedgerUnitOfWork` port. Each `begin` checks an
//! owned connection out of the pool and opens an explicit transaction on it;
//! every subsequent operation runs on that same connection, so `SELECT ...
//! FOR UPDATE` row locks and the `ON CONFLICT DO NOTHING` inserts all
//! participate in one database transaction.
//!
//! # Locking
//!
//! `lock_account` is the serialisation point for concurrent balance updates:
//! Postgres blocks the second locker until the first transaction finalises.
//! `insert_payment_if_absent` leans on `uq_payments_transaction_id` the same
//! way, so concurrent deliveries of one notification resolve to exactly one
//! inserted row.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ports::{
    LedgerStoreError, LedgerTransaction, LedgerUnitOfWork, NewPayment, PaymentInsert,
};
use crate::domain::{Account, AccountId, Payment, TransactionId, User, UserId};

use super::models::{
    AccountRow, NewAccountRow, NewPaymentRow, PaymentRow, RowConversionError, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, payments, users};

/// Diesel-backed implementation of the `LedgerUnitOfWork` port.
#[derive(Clone)]
pub struct PgLedger {
    pool: DbPool,
}

impl PgLedger {
    /// Create a new unit-of-work factory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain ledger store errors.
fn map_pool_error(error: PoolError) -> LedgerStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain ledger store errors.
fn map_diesel_error(error: diesel::result::Error) -> LedgerStoreError {
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
            LedgerStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => LedgerStoreError::query("database error"),
        DieselError::NotFound => LedgerStoreError::query("record not found"),
        _ => LedgerStoreError::query("database error"),
    }
}

fn map_row_error(error: RowConversionError) -> LedgerStoreError {
    LedgerStoreError::query(error.to_string())
}

#[async_trait]
impl LedgerUnitOfWork for PgLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(PgLedgerTransaction { conn, spent: false }))
    }
}

/// One open database transaction on a dedicated pooled connection.
///
/// The owning service always commits or rolls back; if a transaction is
/// dropped without finalising, the pool detects the broken connection on
/// recycling and discards it rather than reusing an open transaction.
struct PgLedgerTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    spent: bool,
}

impl PgLedgerTransaction {
    fn check_live(&self) -> Result<(), LedgerStoreError> {
        if self.spent {
            Err(LedgerStoreError::Spent)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, LedgerStoreError> {
        self.check_live()?;
        let row: Option<UserRow> = users::table
            .find(id.value())
            .select(UserRow::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_domain)
            .transpose()
            .map_err(map_row_error)
    }

    async fn find_payment_by_transaction_id(
        &mut self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Payment>, LedgerStoreError> {
        self.check_live()?;
        let row: Option<PaymentRow> = payments::table
            .filter(payments::transaction_id.eq(transaction_id.as_str()))
            .select(PaymentRow::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PaymentRow::into_domain)
            .transpose()
            .map_err(map_row_error)
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, LedgerStoreError> {
        self.check_live()?;
        let row: Option<AccountRow> = accounts::table
            .find(id.value())
            .select(AccountRow::as_select())
            .for_update()
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(AccountRow::into_domain))
    }

    async fn create_account_if_absent(
        &mut self,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        diesel::insert_into(accounts::table)
            .values(NewAccountRow {
                id: account_id.value(),
                user_id: user_id.value(),
                balance: Decimal::ZERO,
                updated_at: Utc::now(),
            })
            .on_conflict(accounts::id)
            .do_nothing()
            .execute(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn insert_payment_if_absent(
        &mut self,
        payment: NewPayment,
    ) -> Result<PaymentInsert, LedgerStoreError> {
        self.check_live()?;
        // DO NOTHING on conflict returns no row, which `optional` turns
        // into the duplicate signal.
        let row: Option<PaymentRow> = diesel::insert_into(payments::table)
            .values(NewPaymentRow {
                transaction_id: payment.transaction_id.as_str(),
                user_id: payment.user_id.value(),
                account_id: payment.account_id.value(),
                amount: payment.amount,
            })
            .on_conflict(payments::transaction_id)
            .do_nothing()
            .returning(PaymentRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => Ok(PaymentInsert::Inserted(
                row.into_domain().map_err(map_row_error)?,
            )),
            None => Ok(PaymentInsert::AlreadyRecorded),
        }
    }

    async fn apply_balance_delta(
        &mut self,
        account: &Account,
        delta: Decimal,
    ) -> Result<Account, LedgerStoreError> {
        self.check_live()?;
        let row: AccountRow = diesel::update(accounts::table.find(account.id().value()))
            .set((
                accounts::balance.eq(accounts::balance + delta),
                accounts::updated_at.eq(Utc::now()),
            ))
            .returning(AccountRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into_domain())
    }

    async fn commit(&mut self) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        self.spent = true;
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), LedgerStoreError> {
        self.check_live()?;
        self.spent = true;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }
}
