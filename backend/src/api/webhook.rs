//! Payment webhook handler.
//!
//! The single inbound door for payment notifications. Authentication is the
//! notification signature itself; no bearer token is involved. Status codes
//! distinguish the three terminal outcomes: 201 for a first delivery, 200
//! for a redelivery, and 4xx/5xx for declines.

use actix_web::{HttpResponse, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::ports::LedgerStoreError;
use crate::domain::{
    Error, IngestionError, IngestionOutcome, Payment, PaymentNotification, TransactionId,
};

/// Inbound notification payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookIn {
    /// Globally unique idempotency key.
    #[schema(example = "tx-1")]
    pub transaction_id: String,
    /// Target account; created on first sight.
    #[schema(example = 42)]
    pub account_id: i64,
    /// Claimed owning user; must exist.
    #[schema(example = 7)]
    pub user_id: i64,
    /// Fixed-point amount; strings are accepted to avoid float drift.
    #[schema(example = 19.99)]
    pub amount: Decimal,
    /// Hex SHA-256 signature over the notification fields.
    #[schema(example = "98a1b86414e1b57ba3b7af4ee94ed1b0e06c7b0b1a0a4f7d77f2e9ae59e7f981")]
    pub signature: String,
}

/// A committed payment as rendered to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentOut {
    /// Store-generated identifier.
    pub id: i64,
    /// Idempotency key the payment was recorded under.
    pub transaction_id: String,
    /// Credited user.
    pub user_id: i64,
    /// Credited account.
    pub account_id: i64,
    /// Amount rendered as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 19.99)]
    pub amount: Decimal,
}

impl From<Payment> for PaymentOut {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id().value(),
            transaction_id: payment.transaction_id().as_str().to_owned(),
            user_id: payment.user_id().value(),
            account_id: payment.account_id().value(),
            amount: payment.amount(),
        }
    }
}

/// Response body for a redelivery.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DuplicateOut {
    /// Fixed acknowledgement text.
    #[schema(example = "duplicate transaction")]
    pub message: String,
}

fn map_ingestion_error(error: IngestionError) -> ApiError {
    let domain_error = match error {
        IngestionError::SignatureInvalid => Error::invalid_request("invalid signature"),
        IngestionError::UnknownUser(user_id) => {
            Error::not_found(format!("user {user_id} does not exist"))
        }
        IngestionError::AccountOwnerMismatch { account } => {
            Error::conflict(format!("account {account} belongs to a different user"))
        }
        IngestionError::Store(LedgerStoreError::Connection { message }) => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        IngestionError::Store(store_error) => {
            Error::internal(format!("ledger store error: {store_error}"))
        }
    };
    domain_error.into()
}

/// Ingest one payment notification.
#[utoipa::path(
    post,
    path = "/webhooks/payment",
    request_body = WebhookIn,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentOut),
        (status = 200, description = "Duplicate transaction acknowledged", body = DuplicateOut),
        (status = 400, description = "Malformed payload or invalid signature", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError),
        (status = 409, description = "Account owned by a different user", body = ApiError),
        (status = 503, description = "Ledger store unavailable or timed out", body = ApiError)
    ),
    tags = ["webhook"],
    operation_id = "ingestPayment"
)]
#[post("/webhooks/payment")]
pub async fn ingest_payment(
    state: web::Data<AppState>,
    body: web::Json<WebhookIn>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let transaction_id = TransactionId::new(body.transaction_id)
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;

    let notification = PaymentNotification {
        transaction_id,
        account_id: crate::domain::AccountId::new(body.account_id),
        user_id: crate::domain::UserId::new(body.user_id),
        amount: body.amount,
        signature: body.signature,
    };

    let outcome = tokio::time::timeout(state.ingest_timeout, state.ingestion.ingest(notification))
        .await
        .map_err(|_| {
            ApiError::from(Error::service_unavailable("payment ingestion timed out"))
        })?
        .map_err(map_ingestion_error)?;

    match outcome {
        IngestionOutcome::Accepted { payment, .. } => {
            Ok(HttpResponse::Created().json(PaymentOut::from(payment)))
        }
        IngestionOutcome::Duplicate => Ok(HttpResponse::Ok().json(DuplicateOut {
            message: "duplicate transaction".to_owned(),
        })),
    }
}
