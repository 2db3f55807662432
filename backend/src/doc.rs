//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API:
//! webhook ingestion, login, self-service profile reads, administrative
//! user CRUD, and health probes. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Payment ledger API",
        description = "Webhook payment ingestion with an idempotent ledger, \
                       plus user and account management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::webhook::ingest_payment,
        crate::api::auth::login,
        crate::api::users::me,
        crate::api::users::my_accounts,
        crate::api::users::my_payments,
        crate::api::admin::admin_me,
        crate::api::admin::list_users,
        crate::api::admin::create_user,
        crate::api::admin::update_user,
        crate::api::admin::delete_user,
        crate::api::admin::user_accounts,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        crate::api::error::ApiError,
        crate::api::webhook::WebhookIn,
        crate::api::webhook::PaymentOut,
        crate::api::webhook::DuplicateOut,
        crate::api::auth::LoginRequest,
        crate::api::auth::LoginResponse,
        crate::api::users::UserOut,
        crate::api::users::AccountOut,
        crate::api::admin::CreateUserRequest,
        crate::api::admin::UpdateUserRequest,
        crate::api::admin::UserWithAccountsOut,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn document_contains_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/webhooks/payment",
            "/auth/login",
            "/users/me",
            "/users/me/accounts",
            "/users/me/payments",
            "/admin/me",
            "/admin/users",
            "/admin/users/{id}",
            "/admin/users/{id}/accounts",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                paths.iter().any(|path| *path == expected),
                "missing path {expected}"
            );
        }
    }

    #[rstest]
    fn document_declares_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
