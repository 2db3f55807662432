//! Administrative user CRUD handlers.
//!
//! All routes require the admin capability via the [`AdminUser`] extractor.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult};
use crate::api::identity::AdminUser;
use crate::api::state::AppState;
use crate::api::users::{AccountOut, UserOut};
use crate::domain::{CreateUser, Email, Error, UpdateUser, UserId, UserWithAccounts};

/// Fields accepted when provisioning a user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Unique email address.
    #[schema(example = "new@example.com")]
    pub email: String,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Admin capability flag.
    #[serde(default)]
    pub is_admin: bool,
}

/// Partial update; omitted fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement display name.
    pub full_name: Option<String>,
    /// Replacement plaintext password.
    pub password: Option<String>,
    /// Replacement admin flag.
    pub is_admin: Option<bool>,
}

/// A user together with the accounts it owns.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithAccountsOut {
    /// The user record.
    #[serde(flatten)]
    pub user: UserOut,
    /// Accounts owned by the user.
    pub accounts: Vec<AccountOut>,
}

impl From<UserWithAccounts> for UserWithAccountsOut {
    fn from(value: UserWithAccounts) -> Self {
        Self {
            user: UserOut::from(value.user),
            accounts: value.accounts.into_iter().map(AccountOut::from).collect(),
        }
    }
}

fn parse_email(raw: String) -> Result<Email, ApiError> {
    Email::new(raw).map_err(|err| Error::invalid_request(err.to_string()).into())
}

/// The authenticated administrator's own record.
#[utoipa::path(
    get,
    path = "/admin/me",
    responses(
        (status = 200, description = "Authenticated administrator", body = UserOut),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "getAdminMe"
)]
#[get("/admin/me")]
pub async fn admin_me(
    state: web::Data<AppState>,
    admin: AdminUser,
) -> ApiResult<web::Json<UserOut>> {
    let user = state.profile.me(admin.user_id()).await?;
    Ok(web::Json(UserOut::from(user)))
}

/// List every user with its accounts.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users with accounts", body = [UserWithAccountsOut]),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> ApiResult<web::Json<Vec<UserWithAccountsOut>>> {
    let users = state.admin.list_users().await?;
    Ok(web::Json(
        users.into_iter().map(UserWithAccountsOut::from).collect(),
    ))
}

/// Provision a new user.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserOut),
        (status = 400, description = "Malformed email or taken address", body = ApiError),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "createUser"
)]
#[post("/admin/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let user = state
        .admin
        .create_user(CreateUser {
            email: parse_email(body.email)?,
            full_name: body.full_name,
            password: body.password,
            is_admin: body.is_admin,
        })
        .await?;
    Ok(HttpResponse::Created().json(UserOut::from(user)))
}

/// Apply a partial update to a user.
#[utoipa::path(
    patch,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserOut),
        (status = 400, description = "Malformed email or taken address", body = ApiError),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "updateUser"
)]
#[patch("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<i64>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserOut>> {
    let body = body.into_inner();
    let email = body.email.map(parse_email).transpose()?;
    let user = state
        .admin
        .update_user(
            UserId::new(path.into_inner()),
            UpdateUser {
                email,
                full_name: body.full_name,
                password: body.password,
                is_admin: body.is_admin,
            },
        )
        .await?;
    Ok(web::Json(UserOut::from(user)))
}

/// List the accounts owned by a specific user.
#[utoipa::path(
    get,
    path = "/admin/users/{id}/accounts",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Accounts owned by the user", body = [AccountOut]),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "listUserAccounts"
)]
#[get("/admin/users/{id}/accounts")]
pub async fn user_accounts(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<AccountOut>>> {
    let accounts = state
        .admin
        .user_accounts(UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(accounts.into_iter().map(AccountOut::from).collect()))
}

/// Delete a user, cascading to accounts and payments.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .admin
        .delete_user(UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
