//! Port abstraction for payment read access outside the unit of work.

use async_trait::async_trait;

use crate::domain::{Payment, UserId};

/// Persistence errors raised by payment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRepositoryError {
    /// Repository connection could not be established.
    #[error("payment repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("payment repository query failed: {message}")]
    Query { message: String },
}

impl PaymentRepositoryError {
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

/// Read-side persistence port for committed payments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// List the payments recorded for a user.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, PaymentRepositoryError>;
}
