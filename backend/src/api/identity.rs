//! Request extractors establishing the caller's identity.
//!
//! `AuthenticatedUser` validates the bearer token against the configured
//! decoder; `AdminUser` additionally requires the admin claim. Handlers take
//! these as parameters, so an unauthenticated request never reaches the
//! handler body.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::ports::AccessClaims;
use crate::domain::{Error, UserId};

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn claims_from_request(req: &HttpRequest) -> Result<AccessClaims, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| Error::internal("application state not configured"))?;
    let token =
        bearer_token(req).ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    state
        .tokens
        .decode(token)
        .map_err(|_| Error::unauthorized("invalid or expired token").into())
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    claims: AccessClaims,
}

impl AuthenticatedUser {
    /// The caller's user id.
    pub fn user_id(&self) -> UserId {
        self.claims.user_id
    }

    /// Whether the caller holds the admin capability.
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map(|claims| Self { claims }))
    }
}

/// An authenticated caller holding the admin capability.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
    user: AuthenticatedUser,
}

impl AdminUser {
    /// The admin's user id.
    pub fn user_id(&self) -> UserId {
        self.user.user_id()
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).and_then(|claims| {
            if claims.is_admin {
                Ok(Self {
                    user: AuthenticatedUser { claims },
                })
            } else {
                Err(Error::forbidden("admin capability required").into())
            }
        }))
    }
}
