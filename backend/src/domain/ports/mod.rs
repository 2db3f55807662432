//! Outbound ports the domain services depend on.
//!
//! Adapters live under `crate::outbound` and implement these traits; the
//! services only ever see the trait objects, which keeps the transaction
//! and locking semantics testable without a live database.

pub mod account_repository;
pub mod ledger;
pub mod payment_repository;
pub mod security;
pub mod user_repository;

pub use account_repository::{AccountRepository, AccountRepositoryError};
pub use ledger::{
    LedgerStoreError, LedgerTransaction, LedgerUnitOfWork, NewPayment, PaymentInsert,
};
pub use payment_repository::{PaymentRepository, PaymentRepositoryError};
pub use security::{AccessClaims, AccessTokens, PasswordHashError, PasswordHasher, TokenError};
pub use user_repository::{NewUser, UserPatch, UserRepository, UserRepositoryError};

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
#[cfg(test)]
pub use security::{MockAccessTokens, MockPasswordHasher};
#[cfg(test)]
pub use user_repository::MockUserRepository;
