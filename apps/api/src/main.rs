//! Retroscope API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use retroscope_application::{
    AccountService, BillingService, ContextBuilder, ParticipationService, RetroService, RetroStore,
};
use retroscope_core::AppError;
use retroscope_infrastructure::PostgresRetroStore;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let jwt_secret = required_env("AUTH_JWT_SECRET")?;
    let webhook_secret = required_env("BILLING_WEBHOOK_SECRET")?;

    if jwt_secret.len() < 32 {
        return Err(AppError::Validation(
            "AUTH_JWT_SECRET must be at least 32 characters".to_owned(),
        ));
    }

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let store: Arc<dyn RetroStore> = Arc::new(PostgresRetroStore::new(pool));
    let contexts = ContextBuilder::new(Arc::clone(&store));

    let app_state = AppState {
        account_service: AccountService::new(Arc::clone(&store)),
        billing_service: BillingService::new(Arc::clone(&store)),
        participation_service: ParticipationService::new(Arc::clone(&store)),
        retro_service: RetroService::new(contexts),
        jwt_decoding_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
        jwt_validation: Validation::new(Algorithm::HS256),
        webhook_secret_digest: Sha256::digest(webhook_secret.as_bytes()).into(),
    };

    // Owner-facing routes carry the identity middleware; the identity
    // itself stays optional so reads degrade instead of failing.
    let owner_routes = Router::new()
        .route("/auth/sync", post(auth::sync_account_handler))
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/retros",
            get(handlers::retros::list_retros_handler).post(handlers::retros::create_retro_handler),
        )
        .route(
            "/api/retros/{retro_id}",
            get(handlers::retros::get_retro_handler)
                .patch(handlers::retros::update_retro_handler)
                .delete(handlers::retros::delete_retro_handler),
        )
        .route(
            "/api/retros/{retro_id}/entries",
            get(handlers::retros::list_entries_handler),
        )
        .route(
            "/api/retros/{retro_id}/entries/{entry_id}",
            delete(handlers::retros::delete_entry_handler),
        )
        .route(
            "/api/subscription",
            get(handlers::retros::current_subscription_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), auth::attach_identity));

    // Participant routes authenticate by access code alone; the billing
    // webhook by its shared secret.
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/boards/{access_code}",
            get(handlers::boards::board_snapshot_handler),
        )
        .route(
            "/api/boards/{access_code}/entries",
            post(handlers::boards::submit_entry_handler),
        )
        .route(
            "/api/boards/{access_code}/entries/{entry_id}/vote",
            put(handlers::boards::cast_vote_handler)
                .delete(handlers::boards::retract_vote_handler),
        )
        .route(
            "/billing/webhook",
            post(handlers::billing::billing_webhook_handler),
        );

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let app = Router::new()
        .merge(public_routes)
        .merge(owner_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "retroscope-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
