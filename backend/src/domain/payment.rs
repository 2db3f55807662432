//! Payment aggregate: an immutable ledger entry keyed by an external
//! transaction id, plus the inbound notification shape it is built from.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::account::AccountId;
use super::user::UserId;

/// Store-generated identifier for a committed payment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PaymentId(i64);

impl PaymentId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Validation failures raised when constructing a [`TransactionId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionIdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("transaction id must not be empty")]
    Empty,
    /// Identifier contains surrounding whitespace.
    #[error("transaction id must not contain surrounding whitespace")]
    SurroundingWhitespace,
    /// Identifier exceeds the column width.
    #[error("transaction id must be at most 64 characters")]
    TooLong,
}

/// Externally supplied, globally unique idempotency key for a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Construct a transaction id after validating shape and length.
    pub fn new(value: impl Into<String>) -> Result<Self, TransactionIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TransactionIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(TransactionIdValidationError::SurroundingWhitespace);
        }
        if raw.len() > 64 {
            return Err(TransactionIdValidationError::TooLong);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Committed ledger entry. Never mutated or deleted by the ingestion path.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    id: PaymentId,
    transaction_id: TransactionId,
    user_id: UserId,
    account_id: AccountId,
    amount: Decimal,
}

impl Payment {
    /// Assemble a payment from its persisted parts.
    pub const fn new(
        id: PaymentId,
        transaction_id: TransactionId,
        user_id: UserId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Self {
        Self {
            id,
            transaction_id,
            user_id,
            account_id,
            amount,
        }
    }

    /// Store-generated identifier.
    pub const fn id(&self) -> PaymentId {
        self.id
    }

    /// Idempotency key the payment was recorded under.
    pub const fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// User the payment was credited to.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Account the payment was credited to.
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Fixed-point amount.
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Inbound payment notification, possibly delivered more than once.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    /// Idempotency key; the sole field used to collapse duplicates.
    pub transaction_id: TransactionId,
    /// Target account; created lazily if unseen.
    pub account_id: AccountId,
    /// Claimed owning user; must already exist.
    pub user_id: UserId,
    /// Fixed-point amount to credit.
    pub amount: Decimal,
    /// Hex digest presented by the sender.
    pub signature: String,
}
