//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` after a migration.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Unique login email (uq_users_email).
        #[max_length = 255]
        email -> Varchar,
        /// Optional display name.
        #[max_length = 255]
        full_name -> Nullable<Varchar>,
        /// Opaque credential hash.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Admin capability flag.
        is_admin -> Bool,
    }
}

diesel::table! {
    /// Balance ledgers, one row per account.
    accounts (id) {
        /// Primary key; may be supplied by the notification source.
        id -> Int8,
        /// Owning user.
        user_id -> Int8,
        /// Fixed-point balance, NUMERIC(18, 2).
        balance -> Numeric,
        /// Last balance mutation time.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable payment entries keyed by external transaction id.
    payments (id) {
        /// Primary key.
        id -> Int8,
        /// Idempotency key (uq_payments_transaction_id).
        #[max_length = 64]
        transaction_id -> Varchar,
        /// Credited user.
        user_id -> Int8,
        /// Credited account.
        account_id -> Int8,
        /// Fixed-point amount, NUMERIC(18, 2).
        amount -> Numeric,
    }
}

diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(payments -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, payments, users);
