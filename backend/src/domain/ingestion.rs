//! Payment ingestion domain service.
//!
//! Drives one ledger transaction per notification: verify the signature,
//! probe for a duplicate, lock (creating if necessary) the target account,
//! insert the payment behind the idempotency gate, credit the balance, and
//! commit. Every decline path rolls the transaction back before returning,
//! so a rejected notification leaves no trace in the store.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::ports::{
    LedgerStoreError, LedgerTransaction, LedgerUnitOfWork, NewPayment, PaymentInsert,
};
use crate::domain::signature::{WebhookSecret, verify_signature};
use crate::domain::{Account, AccountId, Payment, PaymentNotification, UserId};

/// Terminal result of a successfully processed notification.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionOutcome {
    /// First delivery: the payment is committed and the balance credited.
    Accepted {
        /// The persisted ledger entry.
        payment: Payment,
        /// The account after the credit was applied.
        account: Account,
    },
    /// Redelivery of an already-recorded transaction id; nothing changed.
    Duplicate,
}

/// Declines raised while processing a notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestionError {
    /// Presented signature does not match the notification fields.
    #[error("notification signature is invalid")]
    SignatureInvalid,
    /// Claimed user does not exist.
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    /// Target account exists but belongs to a different user.
    #[error("account {account} belongs to a different user")]
    AccountOwnerMismatch {
        /// The contested account.
        account: AccountId,
    },
    /// The ledger store failed; the notification may be retried.
    #[error(transparent)]
    Store(#[from] LedgerStoreError),
}

/// Processes inbound payment notifications against the ledger.
#[derive(Clone)]
pub struct PaymentIngestionService {
    unit_of_work: Arc<dyn LedgerUnitOfWork>,
    secret: WebhookSecret,
}

impl PaymentIngestionService {
    /// Create the service with its unit-of-work factory and signing secret.
    pub fn new(unit_of_work: Arc<dyn LedgerUnitOfWork>, secret: WebhookSecret) -> Self {
        Self {
            unit_of_work,
            secret,
        }
    }

    /// Process one notification to a terminal outcome.
    ///
    /// Safe to call concurrently for the same transaction id or account:
    /// the store's row locks and unique constraint serialise the writers,
    /// and at most one call commits a payment for a given transaction id.
    pub async fn ingest(
        &self,
        notification: PaymentNotification,
    ) -> Result<IngestionOutcome, IngestionError> {
        if !verify_signature(
            notification.account_id,
            notification.amount,
            &notification.transaction_id,
            notification.user_id,
            &self.secret,
            &notification.signature,
        ) {
            return Err(IngestionError::SignatureInvalid);
        }

        let mut tx = self.unit_of_work.begin().await?;
        match Self::apply(tx.as_mut(), &notification).await {
            Ok(Applied::Credited { payment, account }) => {
                tx.commit().await?;
                tracing::info!(
                    transaction_id = %notification.transaction_id,
                    account_id = %notification.account_id,
                    amount = %notification.amount,
                    "payment recorded"
                );
                Ok(IngestionOutcome::Accepted { payment, account })
            }
            Ok(Applied::Duplicate) => {
                // Nothing to persist; release locks promptly.
                tx.rollback().await?;
                tracing::debug!(
                    transaction_id = %notification.transaction_id,
                    "duplicate notification ignored"
                );
                Ok(IngestionOutcome::Duplicate)
            }
            Err(err) => {
                Self::rollback_quietly(tx.as_mut()).await;
                Err(err)
            }
        }
    }

    /// Run the transactional body. The caller owns finalisation.
    async fn apply(
        tx: &mut dyn LedgerTransaction,
        notification: &PaymentNotification,
    ) -> Result<Applied, IngestionError> {
        if tx
            .find_payment_by_transaction_id(&notification.transaction_id)
            .await?
            .is_some()
        {
            return Ok(Applied::Duplicate);
        }

        if tx.find_user(notification.user_id).await?.is_none() {
            return Err(IngestionError::UnknownUser(notification.user_id));
        }

        let account =
            Self::lock_or_provision_account(tx, notification.user_id, notification.account_id)
                .await?;

        let payment = match tx
            .insert_payment_if_absent(NewPayment::from_notification(notification))
            .await?
        {
            PaymentInsert::Inserted(payment) => payment,
            // Lost the insert race to a concurrent delivery.
            PaymentInsert::AlreadyRecorded => return Ok(Applied::Duplicate),
        };

        let account = Self::credit(tx, &account, notification.amount).await?;
        Ok(Applied::Credited { payment, account })
    }

    /// Lock the target account, creating it for `user_id` if it does not
    /// exist yet. The returned account is held under an exclusive row lock
    /// for the rest of the transaction.
    async fn lock_or_provision_account(
        tx: &mut dyn LedgerTransaction,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<Account, IngestionError> {
        let account = match tx.lock_account(account_id).await? {
            Some(account) => account,
            None => {
                tx.create_account_if_absent(user_id, account_id).await?;
                // Re-read under lock: a concurrent transaction may have won
                // the insert, so the row we lock is the committed one.
                tx.lock_account(account_id).await?.ok_or_else(|| {
                    LedgerStoreError::query(format!(
                        "account {account_id} missing after provisioning"
                    ))
                })?
            }
        };

        if account.user_id() != user_id {
            return Err(IngestionError::AccountOwnerMismatch {
                account: account_id,
            });
        }
        Ok(account)
    }

    async fn credit(
        tx: &mut dyn LedgerTransaction,
        account: &Account,
        amount: Decimal,
    ) -> Result<Account, IngestionError> {
        Ok(tx.apply_balance_delta(account, amount).await?)
    }

    /// Best-effort rollback on the error path. The original error is the
    /// one the caller cares about; a rollback failure only gets logged.
    async fn rollback_quietly(tx: &mut dyn LedgerTransaction) {
        if let Err(err) = tx.rollback().await {
            tracing::warn!(error = %err, "rollback after failed ingestion also failed");
        }
    }
}

enum Applied {
    Credited { payment: Payment, account: Account },
    Duplicate,
}

#[cfg(test)]
#[path = "ingestion_tests.rs"]
mod tests;
