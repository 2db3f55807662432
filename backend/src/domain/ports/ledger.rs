//! Unit-of-work port for the payment ledger.
//!
//! A [`LedgerUnitOfWork`] begins one [`LedgerTransaction`] per business
//! transaction. All store operations on the transaction share a single
//! underlying connection and take effect only when `commit` runs; `rollback`
//! discards them. Adapters never finalise on their own.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{Account, AccountId, Payment, PaymentNotification, TransactionId, User, UserId};

/// Failures surfaced by ledger store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerStoreError {
    /// Connection could not be obtained or the transaction could not begin.
    #[error("ledger store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("ledger store query failed: {message}")]
    Query { message: String },
    /// The transaction was already committed or rolled back.
    #[error("ledger transaction already finalised")]
    Spent,
}

impl LedgerStoreError {
    /// Helper for connection-level failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Payment fields handed to the conditional insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Idempotency key; unique across all time.
    pub transaction_id: TransactionId,
    /// User the payment credits.
    pub user_id: UserId,
    /// Account the payment credits.
    pub account_id: AccountId,
    /// Fixed-point amount.
    pub amount: Decimal,
}

impl NewPayment {
    /// Build the insertable payment from a verified notification.
    pub fn from_notification(notification: &PaymentNotification) -> Self {
        Self {
            transaction_id: notification.transaction_id.clone(),
            user_id: notification.user_id,
            account_id: notification.account_id,
            amount: notification.amount,
        }
    }
}

/// Result of the conditional payment insert.
///
/// `AlreadyRecorded` is the expected signal for "someone already processed
/// this notification" and must never be treated as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentInsert {
    /// This transaction won the race; row returned as persisted.
    Inserted(Payment),
    /// A payment with the same transaction id already exists.
    AlreadyRecorded,
}

/// One transaction-scoped view of the ledger store.
///
/// Operations participate in the enclosing transaction; after `commit` or
/// `rollback` the transaction is spent and every further call fails with
/// [`LedgerStoreError::Spent`].
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Point lookup of a user, no lock.
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, LedgerStoreError>;

    /// Unlocked probe for an existing payment by transaction id.
    ///
    /// This backs the fast-path duplicate check; it is a latency
    /// optimisation and must not be relied on for correctness.
    async fn find_payment_by_transaction_id(
        &mut self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Payment>, LedgerStoreError>;

    /// Read an account while acquiring an exclusive row lock held until the
    /// transaction ends. Blocks while another in-flight transaction holds
    /// the same account's lock. This is the serialisation point for
    /// concurrent balance updates.
    async fn lock_account(&mut self, id: AccountId) -> Result<Option<Account>, LedgerStoreError>;

    /// Atomically insert an account row owned by `user_id`; a concurrent
    /// insert of the same id is a silent no-op, never an error. The caller
    /// must re-read via [`LedgerTransaction::lock_account`] to obtain the
    /// committed row under lock.
    async fn create_account_if_absent(
        &mut self,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<(), LedgerStoreError>;

    /// Atomically insert a payment keyed by transaction id. This is the
    /// authoritative idempotency gate.
    async fn insert_payment_if_absent(
        &mut self,
        payment: NewPayment,
    ) -> Result<PaymentInsert, LedgerStoreError>;

    /// Add `delta` to the account's balance and bump its update time.
    /// Only valid while holding the lock from
    /// [`LedgerTransaction::lock_account`].
    async fn apply_balance_delta(
        &mut self,
        account: &Account,
        delta: Decimal,
    ) -> Result<Account, LedgerStoreError>;

    /// Persist all changes made through this transaction.
    async fn commit(&mut self) -> Result<(), LedgerStoreError>;

    /// Discard all changes made through this transaction.
    async fn rollback(&mut self) -> Result<(), LedgerStoreError>;
}

/// Factory for ledger transactions, one per inbound notification.
#[async_trait]
pub trait LedgerUnitOfWork: Send + Sync {
    /// Begin a transaction on a dedicated connection.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, LedgerStoreError>;
}
