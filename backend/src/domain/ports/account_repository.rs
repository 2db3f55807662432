//! Port abstraction for account read access outside the unit of work.

use async_trait::async_trait;

use crate::domain::{Account, UserId};

/// Persistence errors raised by account repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountRepositoryError {
    /// Repository connection could not be established.
    #[error("account repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("account repository query failed: {message}")]
    Query { message: String },
}

impl AccountRepositoryError {
    /// Helper for connection related adapter errors.
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

/// Read-side persistence port for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// List the accounts owned by a user.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Account>, AccountRepositoryError>;
}
