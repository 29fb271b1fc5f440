//! Router construction.

use axum::{
    middleware as axum_mw,
    routing::{delete, get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{auth, dashboard, health, test_data};
use crate::middleware::jwt::{jwt_auth, JwtConfig};
use crate::state::AppState;

/// Build the full axum router. Dashboard and account routes sit behind the
/// JWT middleware; the test-data surface and login are public.
pub fn build_router(state: AppState, jwt_config: JwtConfig) -> Router {
    let protected = Router::new()
        .route("/api/auth/users/profile/get", get(auth::profile))
        .route("/api/auth/users/logout", post(auth::logout))
        .route("/api/auth/users/refresh", get(auth::refresh))
        .route("/api/dashboard/global-stats", get(dashboard::global_statistics))
        .route("/api/dashboard/trends", get(dashboard::temporal_trends))
        .route("/api/dashboard/devices", get(dashboard::device_performance))
        .route("/api/dashboard/hourly-patterns", get(dashboard::hourly_patterns))
        .route(
            "/api/dashboard/sentiment-distribution",
            get(dashboard::sentiment_distribution),
        )
        .route("/api/dashboard/alerts", get(dashboard::alerts))
        .route("/api/dashboard/complete", get(dashboard::complete))
        .layer(axum_mw::from_fn(jwt_auth));

    let public = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/test-data/generate", post(test_data::generate))
        .route(
            "/api/test-data/feedback/manual",
            post(test_data::add_manual_feedback),
        )
        .route("/api/test-data/devices", get(test_data::devices_for_testing))
        .route("/api/test-data/examples", get(test_data::configuration_examples))
        .route("/api/test-data/clean", delete(test_data::clean));

    public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(Extension(jwt_config))
        .with_state(state)
}
