//! Notification signature derivation and verification.
//!
//! The signature is a SHA-256 digest over the canonical concatenation of the
//! notification fields and a server-held secret, rendered as lowercase hex.
//! Verification compares digests in constant time so the check leaks no
//! timing information about how many leading characters matched.
//!
//! Pure functions: no I/O, no shared mutable state, safe to call from any
//! number of concurrent requests.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::account::AccountId;
use super::payment::TransactionId;
use super::user::UserId;
use rust_decimal::Decimal;

/// Server-held webhook signing secret.
///
/// The secret is zeroized when dropped and never appears in `Debug` output.
#[derive(Clone)]
pub struct WebhookSecret(Zeroizing<String>);

impl WebhookSecret {
    /// Wrap the raw secret material.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

/// Compute the expected signature for a notification.
///
/// The canonical string is `{account_id}{amount}{transaction_id}{user_id}`
/// followed by the secret, where `amount` uses the decimal's display form
/// with its scale preserved (`19.99`, not `19.990000`).
pub fn compute_signature(
    account_id: AccountId,
    amount: Decimal,
    transaction_id: &TransactionId,
    user_id: UserId,
    secret: &WebhookSecret,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.value().to_string().as_bytes());
    hasher.update(amount.to_string().as_bytes());
    hasher.update(transaction_id.as_str().as_bytes());
    hasher.update(user_id.value().to_string().as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a presented signature against the expected one.
///
/// Length is public information (the digest width is fixed), so a length
/// mismatch may return early; matching-length comparisons are constant time.
pub fn verify_signature(
    account_id: AccountId,
    amount: Decimal,
    transaction_id: &TransactionId,
    user_id: UserId,
    secret: &WebhookSecret,
    presented: &str,
) -> bool {
    let expected = compute_signature(account_id, amount, transaction_id, user_id, secret);
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn sample() -> (AccountId, Decimal, TransactionId, UserId, WebhookSecret) {
        (
            AccountId::new(42),
            dec!(19.99),
            TransactionId::new("tx-1").expect("valid id"),
            UserId::new(7),
            WebhookSecret::new("s3cr3t"),
        )
    }

    #[rstest]
    fn matches_reference_vector() {
        // sha256("4219.99tx-17s3cr3t")
        let (account, amount, tx, user, secret) = sample();
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"4219.99tx-17s3cr3t");
            hex::encode(hasher.finalize())
        };
        assert_eq!(
            compute_signature(account, amount, &tx, user, &secret),
            expected
        );
    }

    #[rstest]
    fn verifies_its_own_digest() {
        let (account, amount, tx, user, secret) = sample();
        let digest = compute_signature(account, amount, &tx, user, &secret);
        assert!(verify_signature(
            account, amount, &tx, user, &secret, &digest
        ));
    }

    #[rstest]
    fn rejects_tampered_amount() {
        let (account, amount, tx, user, secret) = sample();
        let digest = compute_signature(account, amount, &tx, user, &secret);
        assert!(!verify_signature(
            account,
            dec!(199.99),
            &tx,
            user,
            &secret,
            &digest
        ));
    }

    #[rstest]
    fn rejects_wrong_secret() {
        let (account, amount, tx, user, secret) = sample();
        let digest = compute_signature(account, amount, &tx, user, &secret);
        let other = WebhookSecret::new("other");
        assert!(!verify_signature(
            account, amount, &tx, user, &other, &digest
        ));
    }

    #[rstest]
    fn scale_is_part_of_the_canonical_string() {
        let (account, _, tx, user, secret) = sample();
        let short = compute_signature(account, dec!(19.99), &tx, user, &secret);
        let long = compute_signature(account, dec!(19.990), &tx, user, &secret);
        assert_ne!(short, long);
    }

    #[rstest]
    fn debug_redacts_secret_material() {
        let secret = WebhookSecret::new("s3cr3t");
        assert!(!format!("{secret:?}").contains("s3cr3t"));
    }
}
