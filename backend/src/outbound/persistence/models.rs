//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations, plus the conversions back
//! into domain aggregates.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{
    Account, AccountId, Email, Payment, PaymentId, TransactionId, User, UserId,
};

use super::schema::{accounts, payments, users};

/// A stored value that no longer satisfies a domain invariant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("corrupted row in {table}: {message}")]
pub(crate) struct RowConversionError {
    pub table: &'static str,
    pub message: String,
}

impl RowConversionError {
    fn new(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, RowConversionError> {
        let email = Email::new(self.email)
            .map_err(|err| RowConversionError::new("users", err.to_string()))?;
        Ok(User::new(
            UserId::new(self.id),
            email,
            self.full_name,
            self.password_hash,
            self.is_admin,
        ))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub full_name: Option<&'a str>,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

/// Changeset struct for partial user updates. `None` fields stay untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserRowPatch<'a> {
    pub email: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub is_admin: Option<bool>,
}

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i64,
    pub user_id: i64,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    pub(crate) fn into_domain(self) -> Account {
        Account::new(
            AccountId::new(self.id),
            UserId::new(self.user_id),
            self.balance,
            self.updated_at,
        )
    }
}

/// Insertable struct for provisioning an account with an explicit id.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow {
    pub id: i64,
    pub user_id: i64,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the payments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: i64,
    pub transaction_id: String,
    pub user_id: i64,
    pub account_id: i64,
    pub amount: Decimal,
}

impl PaymentRow {
    pub(crate) fn into_domain(self) -> Result<Payment, RowConversionError> {
        let transaction_id = TransactionId::new(self.transaction_id)
            .map_err(|err| RowConversionError::new("payments", err.to_string()))?;
        Ok(Payment::new(
            PaymentId::new(self.id),
            transaction_id,
            UserId::new(self.user_id),
            AccountId::new(self.account_id),
            self.amount,
        ))
    }
}

/// Insertable struct for recording a payment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub transaction_id: &'a str,
    pub user_id: i64,
    pub account_id: i64,
    pub amount: Decimal,
}
