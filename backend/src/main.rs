//! Backend entry-point: wires the payment webhook, REST endpoints, and
//! OpenAPI docs over the PostgreSQL adapters.

mod server;

use actix_web::{App, HttpServer, web};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::api::admin::{admin_me, create_user, delete_user, list_users, update_user, user_accounts};
use backend::api::auth::login;
use backend::api::health::{HealthState, live, ready};
use backend::api::users::{me, my_accounts, my_payments};
use backend::api::webhook::ingest_payment;
use backend::api::AppState;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;

use server::{AppSettings, build_app_state, build_pool, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()?;
    run_migrations(settings.database_url()?).await?;
    let pool = build_pool(&settings).await?;
    let state = web::Data::new(build_app_state(&pool, &settings)?);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the probe state stays shared.
    let server_health_state = health_state.clone();
    let server_state = state.clone();
    let bind_addr = settings.bind_addr().to_owned();

    let server = HttpServer::new(move || {
        build_app(server_state.clone(), server_health_state.clone())
    })
    .bind(bind_addr.as_str())?;

    health_state.mark_ready();
    info!(bind_addr = %bind_addr, "server started");
    server.run().await?;
    Ok(())
}

fn build_app(
    state: web::Data<AppState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(state)
        .app_data(health_state)
        .service(ingest_payment)
        .service(login)
        .service(me)
        .service(my_accounts)
        .service(my_payments)
        .service(admin_me)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(user_accounts)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
