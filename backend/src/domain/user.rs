//! User aggregate: identity record owning accounts and payments.
//!
//! Users are created by administrative provisioning only; the ingestion path
//! never creates one implicitly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::account::Account;

/// Surrogate identifier for a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Validation failures raised when constructing an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailValidationError {
    /// Address is empty after trimming whitespace.
    #[error("email must not be empty")]
    Empty,
    /// Address is missing the `@` separator.
    #[error("email must contain '@'")]
    MissingAtSign,
    /// Address exceeds the column width.
    #[error("email must be at most 255 characters")]
    TooLong,
}

/// Globally unique, minimally validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Construct an email after validating shape and length.
    pub fn new(value: impl Into<String>) -> Result<Self, EmailValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if !raw.contains('@') {
            return Err(EmailValidationError::MissingAtSign);
        }
        if raw.len() > 255 {
            return Err(EmailValidationError::TooLong);
        }
        Ok(Self(raw))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Identity record. Owns zero or more accounts and payments; deleting a user
/// cascades to both (administrative path only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    full_name: Option<String>,
    password_hash: String,
    is_admin: bool,
}

impl User {
    /// Assemble a user from its persisted parts.
    pub fn new(
        id: UserId,
        email: Email,
        full_name: Option<String>,
        password_hash: String,
        is_admin: bool,
    ) -> Self {
        Self {
            id,
            email,
            full_name,
            password_hash,
            is_admin,
        }
    }

    /// Surrogate identifier.
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Unique email address.
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Optional display name.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Opaque credential hash; only the password hasher interprets it.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Whether the user holds the admin capability.
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// A user together with the accounts it owns, as listed by administrators.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithAccounts {
    /// The owning user.
    pub user: User,
    /// Accounts belonging to the user.
    pub accounts: Vec<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", EmailValidationError::Empty)]
    #[case("   ", EmailValidationError::Empty)]
    #[case("no-at-sign", EmailValidationError::MissingAtSign)]
    fn email_rejects_invalid_shapes(#[case] raw: &str, #[case] expected: EmailValidationError) {
        assert_eq!(Email::new(raw).unwrap_err(), expected);
    }

    #[rstest]
    fn email_rejects_overlong_address() {
        let raw = format!("{}@example.com", "a".repeat(250));
        assert_eq!(Email::new(raw).unwrap_err(), EmailValidationError::TooLong);
    }

    #[rstest]
    fn email_round_trips() {
        let email = Email::new("ops@example.com").expect("valid email");
        assert_eq!(email.as_str(), "ops@example.com");
    }
}
