//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `APP_`-prefixed environment variables, or a
//! configuration file, in that precedence order. Secrets have no defaults;
//! startup fails fast when one is missing.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_SECS: i64 = 900;
const DEFAULT_INGEST_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// A required setting that was not supplied by any source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required setting {name} is not set (APP_{env})")]
pub struct MissingSetting {
    name: &'static str,
    env: &'static str,
}

impl MissingSetting {
    const fn new(name: &'static str, env: &'static str) -> Self {
        Self { name, env }
    }
}

/// Configuration values controlling the server process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Option<String>,
    /// Shared secret for signing access tokens.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: Option<i64>,
    /// Upper bound on one webhook ingestion attempt, in milliseconds.
    pub ingest_timeout_ms: Option<u64>,
    /// Maximum connections in the database pool.
    pub db_pool_size: Option<u32>,
}

impl AppSettings {
    /// The configured database URL.
    pub fn database_url(&self) -> Result<&str, MissingSetting> {
        self.database_url
            .as_deref()
            .ok_or(MissingSetting::new("database_url", "DATABASE_URL"))
    }

    /// The configured webhook signing secret.
    pub fn webhook_secret(&self) -> Result<&str, MissingSetting> {
        self.webhook_secret
            .as_deref()
            .ok_or(MissingSetting::new("webhook_secret", "WEBHOOK_SECRET"))
    }

    /// The configured token signing secret.
    pub fn jwt_secret(&self) -> Result<&str, MissingSetting> {
        self.jwt_secret
            .as_deref()
            .ok_or(MissingSetting::new("jwt_secret", "JWT_SECRET"))
    }

    /// The bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Access token lifetime.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Upper bound on one webhook ingestion attempt.
    pub fn ingest_timeout(&self) -> Duration {
        Duration::from_millis(self.ingest_timeout_ms.unwrap_or(DEFAULT_INGEST_TIMEOUT_MS))
    }

    /// Maximum connections in the database pool.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_DB_POOL_SIZE)
    }
}
