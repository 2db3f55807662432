//! Port abstraction for user persistence adapters and their errors.
//!
//! These operations run outside the ledger unit of work: single-statement
//! reads and administrative CRUD with no concurrency hazards.

use async_trait::async_trait;

use crate::domain::{Email, User, UserId, UserWithAccounts};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// The email address is already taken.
    #[error("user with email {email} already exists")]
    DuplicateEmail { email: String },
}

impl UserRepositoryError {
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

    /// Helper for unique-email violations.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Fields for creating a user via administrative provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique email address.
    pub email: Email,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Pre-hashed credential.
    pub password_hash: String,
    /// Admin capability flag.
    pub is_admin: bool,
}

/// Partial update applied to an existing user. `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement email address.
    pub email: Option<Email>,
    /// Replacement display name.
    pub full_name: Option<String>,
    /// Replacement credential hash.
    pub password_hash: Option<String>,
    /// Replacement admin flag.
    pub is_admin: Option<bool>,
}

/// Persistence port for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a new user record.
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Apply a partial update; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Delete a user (cascading to accounts and payments); `false` when the
    /// user does not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;

    /// List every user together with the accounts it owns.
    async fn list_with_accounts(&self) -> Result<Vec<UserWithAccounts>, UserRepositoryError>;
}
