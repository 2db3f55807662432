//! Account aggregate: a balance ledger owned by exactly one user.
//!
//! The balance is fixed-point decimal and must always equal the sum of the
//! amounts of all payments referencing the account. It is maintained
//! incrementally under a row lock, never recomputed.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Identifier for an account. May be supplied by the notification source
/// rather than generated by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Balance ledger snapshot for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    user_id: UserId,
    balance: Decimal,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Assemble an account from its persisted parts.
    pub const fn new(
        id: AccountId,
        user_id: UserId,
        balance: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            balance,
            updated_at,
        }
    }

    /// Account identifier.
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Owning user.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Current balance in currency minor-unit scale.
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Last balance mutation time.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
