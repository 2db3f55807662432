//! Login handler exchanging credentials for a bearer token.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::api::users::UserOut;
use crate::domain::{Email, Error};

/// Credential pair presented at login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Registered email address.
    #[schema(example = "payer@example.com")]
    pub email: String,
    /// Plaintext password.
    #[schema(example = "hunter2")]
    pub password: String,
}

/// Issued token plus the authenticated user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token.
    pub access_token: String,
    /// Always `bearer`.
    #[schema(example = "bearer")]
    pub token_type: String,
    /// The authenticated user.
    pub user: UserOut,
}

/// Authenticate and issue an access token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Malformed email", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let body = body.into_inner();
    let email = Email::new(body.email)
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;

    let login = state.auth.login(&email, &body.password).await?;

    Ok(web::Json(LoginResponse {
        access_token: login.token,
        token_type: "bearer".to_owned(),
        user: UserOut::from(login.user),
    }))
}
