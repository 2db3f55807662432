//! Shared application state handed to HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::AccessTokens;
use crate::domain::{AdminService, AuthService, PaymentIngestionService, ProfileService};

/// Services and shared configuration available to every handler.
///
/// Built once at startup over the concrete adapters (or over in-memory
/// doubles in tests) and cloned per worker by Actix.
#[derive(Clone)]
pub struct AppState {
    /// Webhook ingestion service.
    pub ingestion: PaymentIngestionService,
    /// Credential login service.
    pub auth: AuthService,
    /// Administrative user CRUD.
    pub admin: AdminService,
    /// Self-service profile queries.
    pub profile: ProfileService,
    /// Token decoder used by the request extractors.
    pub tokens: Arc<dyn AccessTokens>,
    /// Upper bound on one webhook ingestion attempt.
    pub ingest_timeout: Duration,
}
