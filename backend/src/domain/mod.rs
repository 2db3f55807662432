//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities for the payment ledger and the
//! services that drive them. Keep types immutable and document invariants
//! and serialisation contracts (serde) in each type's Rustdoc. Services
//! depend only on the ports in [`ports`], never on concrete adapters.

pub mod account;
pub mod admin;
pub mod auth;
pub mod error;
pub mod ingestion;
pub mod payment;
pub mod ports;
pub mod profile;
pub mod signature;
pub mod user;

pub use self::account::{Account, AccountId};
pub use self::admin::{AdminService, CreateUser, UpdateUser};
pub use self::auth::{AuthService, Login};
pub use self::error::{Error, ErrorCode};
pub use self::ingestion::{IngestionError, IngestionOutcome, PaymentIngestionService};
pub use self::payment::{
    Payment, PaymentId, PaymentNotification, TransactionId, TransactionIdValidationError,
};
pub use self::profile::ProfileService;
pub use self::signature::{WebhookSecret, compute_signature, verify_signature};
pub use self::user::{Email, EmailValidationError, User, UserId, UserWithAccounts};
