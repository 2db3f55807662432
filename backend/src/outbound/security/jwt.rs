//! HS256 JWT access token adapter.
//!
//! Tokens carry the user id as `sub`, the admin flag, and an expiry; the
//! signing secret is shared across instances so any replica can validate a
//! token issued by another.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{AccessClaims, AccessTokens, TokenError};

/// Wire-format claims. `sub` is the stringified user id per RFC 7519.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    is_admin: bool,
    exp: i64,
}

/// `jsonwebtoken`-backed implementation of the `AccessTokens` port.
#[derive(Clone)]
pub struct JwtAccessTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtAccessTokens {
    /// Create the adapter from the shared signing secret and token lifetime.
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }
}

impl AccessTokens for JwtAccessTokens {
    fn issue(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        let expires_at = Utc::now() + self.token_ttl;
        let claims = Claims {
            sub: claims.user_id.value().to_string(),
            is_admin: claims.is_admin,
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::issue(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Invalid)?;
        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid)?;
        Ok(AccessClaims {
            user_id: UserId::new(user_id),
            is_admin: data.claims.is_admin,
        })
    }
}
