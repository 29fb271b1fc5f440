//! pulsebox-server: standalone REST server.
//!
//! Reads config from env vars:
//!   DATABASE_URL             Postgres connection string (default: local pulsebox)
//!   JWT_SECRET               JWT HMAC secret (required)
//!   BIND_ADDR                listen address (default: 0.0.0.0:3000)
//!   TOKEN_TTL_MINUTES        token lifetime (default: 60)
//!   DATABASE_MAX_CONNECTIONS pool size (default: 10)

use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use pulsebox::config::Config;
use pulsebox::middleware::jwt::JwtConfig;
use pulsebox::router::build_router;
use pulsebox::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulsebox=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    info!("Connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let jwt_config = JwtConfig::from_secret(config.jwt_secret.as_bytes(), config.token_ttl_minutes);
    let state = AppState::new(pool);
    let app = build_router(state, jwt_config);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {}: {e}", config.bind_addr));
    info!("pulsebox-server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
