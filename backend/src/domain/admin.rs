//! Administrative user provisioning service.
//!
//! Create, update, delete, and list users. Plaintext passwords are hashed
//! here so the repository only ever sees opaque hashes. These operations run
//! as single statements outside the ledger unit of work.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, NewUser, PasswordHasher, UserPatch, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Account, Email, User, UserId, UserWithAccounts};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::invalid_request(format!("email {email} is already taken"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
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

/// Fields accepted when an administrator provisions a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Unique email address.
    pub email: Email,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Plaintext password to hash.
    pub password: String,
    /// Admin capability flag.
    pub is_admin: bool,
}

/// Partial update accepted from an administrator. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// Replacement email address.
    pub email: Option<Email>,
    /// Replacement display name.
    pub full_name: Option<String>,
    /// Replacement plaintext password to hash.
    pub password: Option<String>,
    /// Replacement admin flag.
    pub is_admin: Option<bool>,
}

/// Administrative CRUD over user records.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AdminService {
    /// Create the service with its repositories and password hasher.
    pub fn new(
        users: Arc<dyn UserRepository>,
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            accounts,
            hasher,
        }
    }

    /// List every user with the accounts each one owns.
    pub async fn list_users(&self) -> Result<Vec<UserWithAccounts>, Error> {
        self.users
            .list_with_accounts()
            .await
            .map_err(map_repository_error)
    }

    /// Provision a new user.
    pub async fn create_user(&self, request: CreateUser) -> Result<User, Error> {
        let password_hash = self.hash_password(&request.password)?;
        self.users
            .create(NewUser {
                email: request.email,
                full_name: request.full_name,
                password_hash,
                is_admin: request.is_admin,
            })
            .await
            .map_err(map_repository_error)
    }

    /// Apply a partial update to an existing user.
    pub async fn update_user(&self, id: UserId, request: UpdateUser) -> Result<User, Error> {
        let password_hash = request
            .password
            .as_deref()
            .map(|password| self.hash_password(password))
            .transpose()?;
        self.users
            .update(
                id,
                UserPatch {
                    email: request.email,
                    full_name: request.full_name,
                    password_hash,
                    is_admin: request.is_admin,
                },
            )
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// List the accounts owned by the given user.
    pub async fn user_accounts(&self, id: UserId) -> Result<Vec<Account>, Error> {
        if self
            .users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .is_none()
        {
            return Err(Error::not_found(format!("user {id} not found")));
        }
        self.accounts
            .list_by_user(id)
            .await
            .map_err(map_account_error)
    }

    /// Delete a user, cascading to its accounts and payments.
    pub async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let removed = self
            .users
            .delete(id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {id} not found")))
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
