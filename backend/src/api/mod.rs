//! HTTP handlers, error envelope, and request extractors.

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod identity;
pub mod state;
pub mod users;
pub mod webhook;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
