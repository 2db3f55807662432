//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Administrative CRUD and login lookups. Every operation is a single
//! statement on a pooled connection; the unique email constraint is the
//! source of truth for duplicate detection, not a pre-flight query.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{NewUser, UserPatch, UserRepository, UserRepositoryError};
use crate::domain::{Account, Email, User, UserId, UserWithAccounts};

use super::models::{AccountRow, NewUserRow, UserRow, UserRowPatch};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain user repository errors.
fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user repository errors. `email` gives the
/// unique-violation variant its context.
fn map_diesel_error(error: diesel::result::Error, email: &str) -> UserRepositoryError {
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
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserRepositoryError::duplicate_email(email)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        _ => UserRepositoryError::query("database error"),
    }
}

fn map_read_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(error, "")
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    row.into_domain()
        .map_err(|err| UserRepositoryError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.value())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow {
                email: user.email.as_str(),
                full_name: user.full_name.as_deref(),
                password_hash: &user.password_hash,
                is_admin: user.is_admin,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, user.email.as_str()))?;
        row_to_user(row)
    }

    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        // Diesel rejects an empty changeset, so a patch with nothing to
        // change degrades to a plain read.
        if patch == UserPatch::default() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email_context = patch
            .email
            .as_ref()
            .map(Email::as_str)
            .unwrap_or_default()
            .to_owned();

        let row: Option<UserRow> = diesel::update(users::table.find(id.value()))
            .set(UserRowPatch {
                email: patch.email.as_ref().map(Email::as_str),
                full_name: patch.full_name.as_deref(),
                password_hash: patch.password_hash.as_deref(),
                is_admin: patch.is_admin,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, &email_context))?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.find(id.value()))
            .execute(&mut conn)
            .await
            .map_err(map_read_error)?;
        Ok(deleted > 0)
    }

    async fn list_with_accounts(&self) -> Result<Vec<UserWithAccounts>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;

        let account_rows: Vec<AccountRow> = accounts::table
            .order((accounts::user_id.asc(), accounts::id.asc()))
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;

        let mut accounts_by_user: HashMap<i64, Vec<Account>> = HashMap::new();
        for row in account_rows {
            accounts_by_user
                .entry(row.user_id)
                .or_default()
                .push(row.into_domain());
        }

        user_rows
            .into_iter()
            .map(|row| {
                let user = row_to_user(row)?;
                let accounts = accounts_by_user
                    .remove(&user.id().value())
                    .unwrap_or_default();
                Ok(UserWithAccounts { user, accounts })
            })
            .collect()
    }
}
