//! Collaborator ports for credential hashing and bearer tokens.
//!
//! Both are opaque to the domain: the hasher is a one-way function with a
//! verify operation, and tokens are issued/decoded without the domain
//! knowing the wire format.

use thiserror::Error;

use crate::domain::UserId;

/// Failures raised while hashing a credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// The hashing backend rejected the input or its parameters.
    #[error("password hashing failed: {message}")]
    Hash { message: String },
}

impl PasswordHashError {
    /// Helper for hashing failures.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }
}

/// Opaque one-way credential hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext credential for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext credential against a stored hash. Malformed
    /// stored hashes verify as `false` rather than erroring.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessClaims {
    /// Authenticated user.
    pub user_id: UserId,
    /// Admin capability flag.
    pub is_admin: bool,
}

/// Failures raised while issuing or decoding tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token could not be produced.
    #[error("token issuing failed: {message}")]
    Issue { message: String },
    /// Token is malformed, tampered with, or expired.
    #[error("token is invalid")]
    Invalid,
}

impl TokenError {
    /// Helper for issuing failures.
    pub fn issue(message: impl Into<String>) -> Self {
        Self::Issue {
            message: message.into(),
        }
    }
}

/// Issues and decodes bearer access tokens.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokens: Send + Sync {
    /// Issue a signed token for the given claims.
    fn issue(&self, claims: &AccessClaims) -> Result<String, TokenError>;

    /// Decode and validate a presented token.
    fn decode(&self, token: &str) -> Result<AccessClaims, TokenError>;
}
