//! Self-service profile handlers for the authenticated user.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::identity::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::webhook::PaymentOut;
use crate::domain::{Account, User};

/// A user as rendered to clients. Never carries the credential hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserOut {
    /// Surrogate identifier.
    pub id: i64,
    /// Unique email address.
    #[schema(example = "payer@example.com")]
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Admin capability flag.
    pub is_admin: bool,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id().value(),
            email: user.email().as_str().to_owned(),
            full_name: user.full_name().map(str::to_owned),
            is_admin: user.is_admin(),
        }
    }
}

/// An account balance as rendered to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountOut {
    /// Account identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Balance rendered as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 19.99)]
    pub balance: Decimal,
    /// Last balance mutation time.
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountOut {
    fn from(account: Account) -> Self {
        Self {
            id: account.id().value(),
            user_id: account.user_id().value(),
            balance: account.balance(),
            updated_at: account.updated_at(),
        }
    }
}

/// The authenticated user's own record.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserOut),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["users"],
    operation_id = "getMe"
)]
#[get("/users/me")]
pub async fn me(state: web::Data<AppState>, user: AuthenticatedUser) -> ApiResult<web::Json<UserOut>> {
    let user = state.profile.me(user.user_id()).await?;
    Ok(web::Json(UserOut::from(user)))
}

/// Accounts owned by the authenticated user.
#[utoipa::path(
    get,
    path = "/users/me/accounts",
    responses(
        (status = 200, description = "Accounts", body = [AccountOut]),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["users"],
    operation_id = "listMyAccounts"
)]
#[get("/users/me/accounts")]
pub async fn my_accounts(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<AccountOut>>> {
    let accounts = state.profile.my_accounts(user.user_id()).await?;
    Ok(web::Json(accounts.into_iter().map(AccountOut::from).collect()))
}

/// Payments recorded for the authenticated user.
#[utoipa::path(
    get,
    path = "/users/me/payments",
    responses(
        (status = 200, description = "Payments", body = [PaymentOut]),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["users"],
    operation_id = "listMyPayments"
)]
#[get("/users/me/payments")]
pub async fn my_payments(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<PaymentOut>>> {
    let payments = state.profile.my_payments(user.user_id()).await?;
    Ok(web::Json(payments.into_iter().map(PaymentOut::from).collect()))
}
