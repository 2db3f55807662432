//! Credential login service.
//!
//! Exchanges an email/password pair for a bearer access token. Every
//! credential failure maps to the same unauthorized error so the response
//! does not reveal whether the email exists.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::ports::{
    AccessClaims, AccessTokens, PasswordHasher, TokenError, UserRepository, UserRepositoryError,
};
use crate::domain::{Email, User};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Issued token plus the authenticated user, for response shaping.
#[derive(Debug, Clone)]
pub struct Login {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Authenticates credentials and issues access tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn AccessTokens>,
}

impl AuthService {
    /// Create the service with its user repository, hasher, and token issuer.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn AccessTokens>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Verify credentials and issue a token for the matching user.
    pub async fn login(&self, email: &Email, password: &str) -> Result<Login, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(Self::bad_credentials)?;

        if !self.hasher.verify(password, user.password_hash()) {
            return Err(Self::bad_credentials());
        }

        let token = self
            .tokens
            .issue(&AccessClaims {
                user_id: user.id(),
                is_admin: user.is_admin(),
            })
            .map_err(|err| match err {
                TokenError::Issue { message } => {
                    Error::internal(format!("token issuing failed: {message}"))
                }
                TokenError::Invalid => Error::internal("token issuing produced an invalid token"),
            })?;

        Ok(Login { token, user })
    }

    fn bad_credentials() -> Error {
        Error::unauthorized("invalid email or password")
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
