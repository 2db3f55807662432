//! Self-service profile queries for an authenticated user.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, PaymentRepository, PaymentRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{Account, Payment, User, UserId};

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
    }
}

fn map_payment_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment repository unavailable: {message}"))
        }
        PaymentRepositoryError::Query { message } => {
            Error::internal(format!("payment repository error: {message}"))
        }
    }
}

/// Read-side queries scoped to the requesting user.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn AccountRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl ProfileService {
    /// Create the service with its read-side repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        accounts: Arc<dyn AccountRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            users,
            accounts,
            payments,
        }
    }

    /// The requesting user's own record.
    ///
    /// A missing row means the user was deleted after the token was issued,
    /// so the caller is no longer authorised.
    pub async fn me(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("user no longer exists"))
    }

    /// Accounts owned by the requesting user.
    pub async fn my_accounts(&self, user_id: UserId) -> Result<Vec<Account>, Error> {
        self.accounts
            .list_by_user(user_id)
            .await
            .map_err(map_account_error)
    }

    /// Payments recorded for the requesting user.
    pub async fn my_payments(&self, user_id: UserId) -> Result<Vec<Payment>, Error> {
        self.payments
            .list_by_user(user_id)
            .await
            .map_err(map_payment_error)
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
