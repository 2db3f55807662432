//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain persistence ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: implementations only translate between Diesel rows
//!   and domain types. No business logic resides here; in particular the
//!   decision of what a duplicate payment means lives in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed
//!   to the domain layer.
//! - **One connection per transaction**: [`PgLedger`] pins each unit of
//!   work to one pooled connection so row locks and conditional inserts
//!   share a database transaction. The read-side repositories borrow a
//!   connection per statement instead.

mod diesel_account_repository;
mod diesel_payment_repository;
mod diesel_user_repository;
mod models;
mod pg_ledger;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pg_ledger::PgLedger;
pub use pool::{DbPool, PoolConfig, PoolError};
