//! Router configuration for Web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    admin_cleanup_login_attempts, admin_cleanup_sessions, admin_list_login_attempts,
    admin_list_sessions, admin_session_stats, admin_sweep_sessions, get_page, login, logout, me,
    AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me));

    let page_routes = Router::new().route("/:page", get(get_page));

    let admin_routes = Router::new()
        .route(
            "/sessions",
            get(admin_list_sessions).delete(admin_cleanup_sessions),
        )
        .route("/sessions/stats", get(admin_session_stats))
        .route("/sessions/sweep", post(admin_sweep_sessions))
        .route(
            "/login-attempts",
            get(admin_list_login_attempts).delete(admin_cleanup_login_attempts),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/pages", page_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
